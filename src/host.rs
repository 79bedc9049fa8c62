pub(crate) mod embedded;
pub(crate) mod native;
