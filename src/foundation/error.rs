/// Convenience alias for results produced by this crate.
pub type MatteResult<T> = Result<T, MatteError>;

/// Error type shared by keying, media, rendering and session code.
#[derive(thiserror::Error, Debug)]
pub enum MatteError {
    /// Invalid input or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Media could not be probed or decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// A GPU adapter, device or surface could not be acquired or used.
    #[error("gpu error: {0}")]
    Gpu(String),

    /// Runtime failure while compositing or driving a session.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Configuration (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error, with its source preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MatteError {
    /// Build a [`MatteError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MatteError::Decode`].
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`MatteError::Gpu`].
    pub fn gpu(msg: impl Into<String>) -> Self {
        Self::Gpu(msg.into())
    }

    /// Build a [`MatteError::Evaluation`].
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`MatteError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
