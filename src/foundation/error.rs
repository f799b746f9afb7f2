/// Convenience result type used across the engine.
pub type EngineResult<T> = Result<T, EngineError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Recoverable conditions (missing assets, out-of-range windows, failed center detection,
/// infeasible tail merges) never surface here; they are handled where they occur and logged.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// Invalid caller-provided configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Probing or decoding a media source failed.
    #[error("media error: {0}")]
    Media(String),

    /// The external encoder failed or could not be driven.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EngineError {
    /// Build an [`EngineError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`EngineError::Media`] value.
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    /// Build an [`EngineError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build an [`EngineError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
