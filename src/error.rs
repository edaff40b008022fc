//! Application error types and handling.
//!
//! `AppError` covers everything that can fail inside the orchestrator;
//! `UploadError` is the small set of user-facing pipeline messages that
//! are stored as session state and rendered inline.

/// Application error types.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Upstream service responded with a non-success status.
    #[error("Upstream returned status {0}")]
    UpstreamStatus(u16),

    /// Catalog token acquisition failed.
    #[error("Token acquisition failed: {0}")]
    TokenAcquisition(String),

    /// Audio output or decoding failure.
    #[error("Audio error: {0}")]
    Audio(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Create an error from a non-success upstream response status.
    pub fn upstream(status: reqwest::StatusCode) -> Self {
        Self::UpstreamStatus(status.as_u16())
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;

/// User-facing upload pipeline errors.
///
/// These are deliberately generic: transport and server detail never leaks
/// into the message a user sees. The `Display` strings are the exact inline
/// messages rendered next to the upload surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    /// The candidate file's declared media type is not the accepted one.
    #[error("Please select a WAV file")]
    UnsupportedMediaType,

    /// Submission was attempted with no file selected.
    #[error("Please select a file first.")]
    NoFileSelected,

    /// The classification request failed (any transport or server error).
    #[error("Error processing the audio file. Please try again.")]
    ClassificationFailed,
}
