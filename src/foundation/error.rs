/// Convenience result type used across Tartil.
pub type TartilResult<T> = Result<T, TartilError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum TartilError {
    /// Invalid user-provided or session data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Content collaborator failures (network, missing resources, AI calls).
    #[error("content error: {0}")]
    Content(String),

    /// Malformed or unrecognizable timestamp report text.
    #[error("report format error: {0}")]
    Report(String),

    /// Errors while probing, decoding or positioning host media.
    #[error("media error: {0}")]
    Media(String),

    /// Errors in the capture pipeline (encoder, recorder state machine).
    #[error("capture error: {0}")]
    Capture(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TartilError {
    /// Build a [`TartilError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TartilError::Content`] value.
    pub fn content(msg: impl Into<String>) -> Self {
        Self::Content(msg.into())
    }

    /// Build a [`TartilError::Report`] value.
    pub fn report(msg: impl Into<String>) -> Self {
        Self::Report(msg.into())
    }

    /// Build a [`TartilError::Media`] value.
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    /// Build a [`TartilError::Capture`] value.
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
