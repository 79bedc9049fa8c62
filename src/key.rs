pub(crate) mod matte;
pub(crate) mod params;
