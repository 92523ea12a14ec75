//! Ollama `/api/generate` client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{GenerateError, Generator};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const EMPTY_RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Client for a locally hosted Ollama server.
pub struct OllamaClient {
    client: reqwest::Client,
    host: String,
    model: String,
}

impl OllamaClient {
    pub fn new(host: &str, model: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// One round-trip to `/api/generate`. Returns the body text of a
    /// successful response, undecoded.
    async fn request_once(&self, prompt: &str) -> Result<String, GenerateError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.host))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }

    /// Decode the `response` field, treating a blank result as absent.
    fn decode(body: &str) -> Option<String> {
        let parsed: GenerateResponse = serde_json::from_str(body).ok()?;
        let text = parsed.response.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }

    /// Ping the server so `doctor` can report reachability.
    pub async fn check_reachable(&self) -> Result<(), GenerateError> {
        self.client
            .get(format!("{}/api/tags", self.host))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Decode one round-trip's body, retrying `request` exactly once
    /// after a short pause when the body is empty or malformed. A second
    /// such body yields `EmptyResponse`; transport errors are not
    /// retried here (the fetch layer owns backoff).
    async fn generate_with_retry<F, Fut>(request: F) -> Result<String, GenerateError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<String, GenerateError>>,
    {
        let body = request().await?;
        if let Some(text) = Self::decode(&body) {
            return Ok(text);
        }

        debug!("Empty generation response, retrying once");
        tokio::time::sleep(EMPTY_RETRY_DELAY).await;

        let body = request().await?;
        Self::decode(&body).ok_or(GenerateError::EmptyResponse)
    }
}

#[async_trait]
impl Generator for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        Self::generate_with_retry(|| self.request_once(prompt)).await
    }
}
