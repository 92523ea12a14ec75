//! YouTube caption source.
//!
//! Thin wrapper over YouTube's public caption endpoints: scrape the watch
//! page for the caption track URL, then fetch the track in `json3` form.

use async_trait::async_trait;
use regex::Regex;

use super::{CaptionEntry, TranscriptError, TranscriptSource};

/// Fetches captions straight from YouTube over HTTP.
pub struct YoutubeCaptionSource {
    client: reqwest::Client,
    caption_track_regex: Regex,
}

impl YoutubeCaptionSource {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; yttp)")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let caption_track_regex = Regex::new(r#""captionTracks":\[\{"baseUrl":"([^"]+)""#)
            .expect("Invalid regex");

        Self {
            client,
            caption_track_regex,
        }
    }

    /// Pull the first caption track URL out of the watch page.
    fn caption_track_url(&self, page: &str, video_id: &str) -> Result<String, TranscriptError> {
        if page.contains(r#""playabilityStatus":{"status":"ERROR""#) {
            return Err(TranscriptError::Unavailable(video_id.to_string()));
        }

        let caps = self
            .caption_track_regex
            .captures(page)
            .ok_or_else(|| TranscriptError::Disabled(video_id.to_string()))?;

        // The URL is JSON-escaped inside the page source.
        let url = caps[1].replace("\\u0026", "&").replace("\\/", "/");
        Ok(url)
    }

    /// Parse a `json3` caption payload into ordered entries.
    fn parse_json3(
        payload: &str,
        video_id: &str,
    ) -> Result<Vec<CaptionEntry>, TranscriptError> {
        let json: serde_json::Value = serde_json::from_str(payload)
            .map_err(|e| TranscriptError::Fetch(format!("Failed to parse captions: {}", e)))?;

        let mut entries = Vec::new();
        for event in json["events"].as_array().into_iter().flatten() {
            let Some(segs) = event["segs"].as_array() else {
                continue;
            };
            let text: String = segs
                .iter()
                .filter_map(|seg| seg["utf8"].as_str())
                .collect();
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            let start = event["tStartMs"].as_f64().unwrap_or(0.0) / 1000.0;
            let duration = event["dDurationMs"].as_f64().unwrap_or(0.0) / 1000.0;
            entries.push(CaptionEntry::new(text, start, duration));
        }

        if entries.is_empty() {
            return Err(TranscriptError::NotFound(video_id.to_string()));
        }
        Ok(entries)
    }
}

impl Default for YoutubeCaptionSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptSource for YoutubeCaptionSource {
    async fn captions(&self, video_id: &str) -> Result<Vec<CaptionEntry>, TranscriptError> {
        let watch_url = format!("https://www.youtube.com/watch?v={}&hl=en", video_id);
        let page = self
            .client
            .get(&watch_url)
            .send()
            .await
            .map_err(|e| TranscriptError::Fetch(format!("Failed to load watch page: {}", e)))?
            .text()
            .await
            .map_err(|e| TranscriptError::Fetch(format!("Failed to read watch page: {}", e)))?;

        let track_url = self.caption_track_url(&page, video_id)?;

        let payload = self
            .client
            .get(format!("{}&fmt=json3", track_url))
            .send()
            .await
            .map_err(|e| TranscriptError::Fetch(format!("Failed to load captions: {}", e)))?
            .text()
            .await
            .map_err(|e| TranscriptError::Fetch(format!("Failed to read captions: {}", e)))?;

        Self::parse_json3(&payload, video_id)
    }
}
