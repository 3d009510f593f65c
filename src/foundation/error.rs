/// Convenience result type used across magikd.
pub type MagikdResult<T> = Result<T, MagikdError>;

/// Top-level error taxonomy used by the pipeline, charts and service.
#[derive(thiserror::Error, Debug)]
pub enum MagikdError {
    /// Missing, empty or malformed caller-provided data.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The decoded source holds more frames than the pipeline accepts.
    #[error("too many frames: {frames} (max {max})")]
    FrameLimitExceeded {
        /// Frames found in the source (a lower bound when decoding stopped early).
        frames: usize,
        /// Configured maximum.
        max: usize,
    },

    /// An imaging primitive failed on the pixel data.
    #[error("processing error: {0}")]
    Processing(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MagikdError {
    /// Build a [`MagikdError::InvalidInput`] value.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Build a [`MagikdError::FrameLimitExceeded`] value.
    pub fn frame_limit(frames: usize, max: usize) -> Self {
        Self::FrameLimitExceeded { frames, max }
    }

    /// Build a [`MagikdError::Processing`] value.
    pub fn processing(msg: impl Into<String>) -> Self {
        Self::Processing(msg.into())
    }

    /// Build a [`MagikdError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether the error should be reported to the caller as their mistake rather than a fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::FrameLimitExceeded { .. } | Self::Serde(_)
        )
    }
}

impl From<serde_json::Error> for MagikdError {
    fn from(value: serde_json::Error) -> Self {
        Self::serde(value.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
