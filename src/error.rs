//! Error types for yttp.

use thiserror::Error;

/// Library-level error type for yttp operations.
#[derive(Error, Debug)]
pub enum YttpError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Transcript unavailable for this video.")]
    TranscriptUnavailable,

    #[error("Error extracting transcript: {0}")]
    TranscriptExtraction(String),

    #[error("Error splitting transcript: {0}")]
    Split(String),

    #[error("No processed chunks to combine.")]
    NoProcessedChunks,

    #[error("Operation cancelled.")]
    Cancelled,

    #[error("Error saving file: {0}")]
    Combine(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for yttp operations.
pub type Result<T> = std::result::Result<T, YttpError>;
