//! Transcript retrieval for YouTube videos.
//!
//! The caption service itself sits behind the [`TranscriptSource`] trait so
//! tests can substitute a fake; retry and persistence live in
//! [`TranscriptFetcher`].

mod fetcher;
mod youtube;

pub use fetcher::TranscriptFetcher;
pub use youtube::YoutubeCaptionSource;

use async_trait::async_trait;
use thiserror::Error;

/// One caption entry as returned by the transcript source.
///
/// Timing is carried through for completeness but the pipeline only uses
/// the text.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionEntry {
    pub text: String,
    /// Start offset in seconds.
    pub start: f64,
    /// Duration in seconds.
    pub duration: f64,
}

impl CaptionEntry {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// Failure modes of a transcript source. All variants are retry-eligible.
#[derive(Debug, Error)]
pub enum TranscriptError {
    /// No transcript exists for this video.
    #[error("no transcript found for video {0}")]
    NotFound(String),

    /// The video exists but captions are disabled.
    #[error("transcripts are disabled for video {0}")]
    Disabled(String),

    /// The video itself is unavailable.
    #[error("video {0} is unavailable")]
    Unavailable(String),

    /// Transport or decode failure while talking to the caption service.
    #[error("{0}")]
    Fetch(String),
}

impl TranscriptError {
    /// Whether this maps to the terminal "transcript unavailable" error
    /// (as opposed to a generic extraction error) once retries run out.
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, TranscriptError::Fetch(_))
    }
}

/// Source of caption entries for a video id.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn captions(&self, video_id: &str)
        -> std::result::Result<Vec<CaptionEntry>, TranscriptError>;
}

/// Extract a video id from either YouTube URL shape.
///
/// `youtu.be/<id>` takes the final path segment; anything else takes the
/// text after `v=` up to the next `&`. No format validation is done; a
/// malformed id surfaces as a downstream fetch failure, not here.
pub fn extract_video_id(url: &str) -> String {
    let url = url.trim();
    if url.contains("youtu.be") {
        let tail = url.rsplit('/').next().unwrap_or(url);
        tail.split('?').next().unwrap_or(tail).to_string()
    } else {
        let tail = url.rsplit("v=").next().unwrap_or(url);
        tail.split('&').next().unwrap_or(tail).to_string()
    }
}
