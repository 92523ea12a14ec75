//! Transcript fetch with bounded retry and persistence.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::{extract_video_id, TranscriptError, TranscriptSource};
use crate::config::Settings;
use crate::error::{Result, YttpError};
use crate::pipeline::CancelToken;
use crate::workspace::Workspace;

/// Retrieves a transcript with retry/backoff and writes it to the
/// workspace.
pub struct TranscriptFetcher {
    source: Arc<dyn TranscriptSource>,
    workspace: Workspace,
    retry_count: u32,
    config_path: PathBuf,
}

impl TranscriptFetcher {
    pub fn new(
        source: Arc<dyn TranscriptSource>,
        workspace: Workspace,
        retry_count: u32,
        config_path: PathBuf,
    ) -> Self {
        Self {
            source,
            workspace,
            retry_count,
            config_path,
        }
    }

    /// Fetch the transcript for `url` and persist it.
    ///
    /// Makes up to `retry_count + 1` attempts with doubling delays
    /// (1s, 2s, 4s, ...) between them. Settings are mutated and saved
    /// only on success: `last_video_id` is recorded and the full mapping
    /// written back. Returns the transcript path and the video id.
    pub async fn fetch(
        &self,
        url: &str,
        settings: &mut Settings,
        cancel: &CancelToken,
    ) -> Result<(PathBuf, String)> {
        let video_id = extract_video_id(url);
        let mut delay = Duration::from_secs(1);
        let mut last_error = None;

        for attempt in 0..=self.retry_count {
            if cancel.is_cancelled() {
                return Err(YttpError::Cancelled);
            }

            match self.source.captions(&video_id).await {
                Ok(entries) => {
                    let text = entries
                        .iter()
                        .map(|entry| entry.text.as_str())
                        .collect::<Vec<_>>()
                        .join("\n");

                    let transcript_path = self.workspace.transcript_path(&video_id);
                    std::fs::write(&transcript_path, &text)?;

                    settings.last_video_id = video_id.clone();
                    settings.save_to(&self.config_path)?;

                    info!(
                        "Fetched transcript for {} ({} entries)",
                        video_id,
                        entries.len()
                    );
                    return Ok((transcript_path, video_id));
                }
                Err(e) => {
                    if attempt < self.retry_count {
                        warn!(
                            "Transcript fetch attempt {} failed, retrying in {:?}: {}",
                            attempt + 1,
                            delay,
                            e
                        );
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    } else {
                        debug!("Transcript fetch gave up after {} attempts", attempt + 1);
                    }
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if e.is_unavailable() => Err(YttpError::TranscriptUnavailable),
            Some(TranscriptError::Fetch(detail)) => Err(YttpError::TranscriptExtraction(detail)),
            // retry_count is unsigned, so at least one attempt always runs.
            _ => Err(YttpError::TranscriptUnavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::CaptionEntry;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source that fails a fixed number of times before succeeding.
    struct FlakySource {
        failures: usize,
        attempts: AtomicUsize,
    }

    impl FlakySource {
        fn new(failures: usize) -> Self {
            Self {
                failures,
                attempts: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TranscriptSource for FlakySource {
        async fn captions(
            &self,
            video_id: &str,
        ) -> std::result::Result<Vec<CaptionEntry>, TranscriptError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if attempt < self.failures {
                Err(TranscriptError::Unavailable(video_id.to_string()))
            } else {
                Ok(vec![
                    CaptionEntry::new("first line", 0.0, 2.0),
                    CaptionEntry::new("second line", 2.0, 2.0),
                ])
            }
        }
    }

    fn setup() -> (tempfile::TempDir, Workspace, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path().join("temp"));
        workspace.init().unwrap();
        let config_path = dir.path().join("config.json");
        (dir, workspace, config_path)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_succeeds_and_persists() {
        let (_dir, workspace, config_path) = setup();
        let source = Arc::new(FlakySource::new(0));
        let fetcher = TranscriptFetcher::new(source.clone(), workspace, 3, config_path.clone());

        let mut settings = Settings::default();
        let (path, video_id) = fetcher
            .fetch(
                "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
                &mut settings,
                &CancelToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(video_id, "dQw4w9WgXcQ");
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "first line\nsecond line"
        );
        assert_eq!(settings.last_video_id, "dQw4w9WgXcQ");
        assert!(config_path.exists());
        assert_eq!(source.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_retries_then_succeeds() {
        let (_dir, workspace, config_path) = setup();
        let source = Arc::new(FlakySource::new(2));
        let fetcher = TranscriptFetcher::new(source.clone(), workspace, 3, config_path);

        let mut settings = Settings::default();
        let start = tokio::time::Instant::now();
        fetcher
            .fetch("https://youtu.be/dQw4w9WgXcQ", &mut settings, &CancelToken::new())
            .await
            .unwrap();

        // Two failures cost 1s + 2s of backoff before the third attempt.
        assert_eq!(source.attempts.load(Ordering::SeqCst), 3);
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_exhausts_retries() {
        let (_dir, workspace, config_path) = setup();
        let source = Arc::new(FlakySource::new(usize::MAX));
        let fetcher = TranscriptFetcher::new(source.clone(), workspace, 2, config_path.clone());

        let mut settings = Settings::default();
        let err = fetcher
            .fetch("https://youtu.be/dQw4w9WgXcQ", &mut settings, &CancelToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, YttpError::TranscriptUnavailable));
        // retry_count + 1 total attempts.
        assert_eq!(source.attempts.load(Ordering::SeqCst), 3);
        // Settings untouched on failure.
        assert_eq!(settings.last_video_id, "");
        assert!(!config_path.exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_error_maps_to_extraction_detail() {
        struct BrokenSource;

        #[async_trait]
        impl TranscriptSource for BrokenSource {
            async fn captions(
                &self,
                _video_id: &str,
            ) -> std::result::Result<Vec<CaptionEntry>, TranscriptError> {
                Err(TranscriptError::Fetch("connection reset".to_string()))
            }
        }

        let (_dir, workspace, config_path) = setup();
        let fetcher = TranscriptFetcher::new(Arc::new(BrokenSource), workspace, 0, config_path);

        let err = fetcher
            .fetch(
                "https://youtu.be/dQw4w9WgXcQ",
                &mut Settings::default(),
                &CancelToken::new(),
            )
            .await
            .unwrap_err();

        match err {
            YttpError::TranscriptExtraction(detail) => {
                assert!(detail.contains("connection reset"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_honors_cancellation() {
        let (_dir, workspace, config_path) = setup();
        let source = Arc::new(FlakySource::new(0));
        let fetcher = TranscriptFetcher::new(source.clone(), workspace, 3, config_path);

        let cancel = CancelToken::new();
        cancel.cancel();

        let err = fetcher
            .fetch("https://youtu.be/dQw4w9WgXcQ", &mut Settings::default(), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, YttpError::Cancelled));
        assert_eq!(source.attempts.load(Ordering::SeqCst), 0);
    }
}
