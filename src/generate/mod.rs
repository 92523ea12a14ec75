//! Text generation against a local LLM endpoint.
//!
//! The endpoint lives behind the [`Generator`] trait; [`ChunkProcessor`]
//! wraps it with the per-chunk prompt, cancellation checks, and the
//! degrade-to-placeholder contract.

mod ollama;
mod processor;

pub use ollama::OllamaClient;
pub use processor::ChunkProcessor;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from a generation endpoint.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// HTTP transport or connection failure.
    #[error("request failed: {0}")]
    Request(String),

    /// Non-success HTTP status.
    #[error("server returned {0}")]
    Status(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The response body was empty or not decodable, twice in a row.
    #[error("empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for GenerateError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GenerateError::Timeout
        } else if e.is_status() {
            GenerateError::Status(e.to_string())
        } else {
            GenerateError::Request(e.to_string())
        }
    }
}

/// A text-generation endpoint.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> std::result::Result<String, GenerateError>;
}
