//! Per-chunk processing with the degrade-to-placeholder contract.

use std::path::Path;
use std::sync::Arc;

use tracing::warn;

use super::{GenerateError, Generator};
use crate::pipeline::CancelToken;
use crate::workspace::Workspace;

const CANCELLED_PLACEHOLDER: &str = "[Generation cancelled]";
const EMPTY_PLACEHOLDER: &str = "[Unable to fetch transcript or response is empty]";

/// Sends one chunk at a time to the generation endpoint and persists the
/// result.
///
/// `process` never fails: every failure mode is folded into a placeholder
/// string so a bad chunk can never abort the batch. Placeholders are
/// persisted like any other output and end up in the combined document.
pub struct ChunkProcessor {
    generator: Arc<dyn Generator>,
    workspace: Workspace,
    prompt: String,
}

impl ChunkProcessor {
    pub fn new(generator: Arc<dyn Generator>, workspace: Workspace, prompt: &str) -> Self {
        Self {
            generator,
            workspace,
            prompt: prompt.to_string(),
        }
    }

    /// The instruction-plus-chunk prompt sent to the endpoint.
    fn combined_prompt(&self, chunk_text: &str) -> String {
        format!(
            "Processing Instruction:\n{}\n\nApply the above instruction to the following text:\n{}",
            self.prompt, chunk_text
        )
    }

    /// Process one chunk file, returning the generated text (or a
    /// placeholder) after writing it to the processed directory.
    ///
    /// The cancel flag is checked immediately before and after the
    /// network call; once set, the current text is replaced with the
    /// cancelled placeholder and no further work happens.
    pub async fn process(&self, chunk_path: &Path, cancel: &CancelToken) -> String {
        let text = self.generate_for_chunk(chunk_path, cancel).await;
        self.persist(chunk_path, &text);
        text
    }

    async fn generate_for_chunk(&self, chunk_path: &Path, cancel: &CancelToken) -> String {
        if cancel.is_cancelled() {
            return CANCELLED_PLACEHOLDER.to_string();
        }

        let chunk_text = match std::fs::read_to_string(chunk_path) {
            Ok(text) => text,
            Err(e) => return format!("[Error processing chunk: {}]", e),
        };

        let result = self.generator.generate(&self.combined_prompt(&chunk_text)).await;

        if cancel.is_cancelled() {
            return CANCELLED_PLACEHOLDER.to_string();
        }

        match result {
            Ok(text) => text,
            Err(GenerateError::EmptyResponse) => EMPTY_PLACEHOLDER.to_string(),
            Err(e) => format!("[Error processing chunk: {}]", e),
        }
    }

    /// Write the output under the source chunk's file name. A persist
    /// failure is logged and the text still returned; the combine step
    /// will simply see one file fewer.
    fn persist(&self, chunk_path: &Path, text: &str) {
        let Some(name) = chunk_path.file_name().and_then(|n| n.to_str()) else {
            warn!("Chunk path {} has no usable file name", chunk_path.display());
            return;
        };
        let output_path = self.workspace.processed_path(name);
        if let Err(e) = std::fs::write(&output_path, text) {
            warn!("Failed to persist processed chunk {}: {}", name, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeGenerator {
        result: fn() -> Result<String, GenerateError>,
        calls: AtomicUsize,
        last_prompt: std::sync::Mutex<String>,
    }

    impl FakeGenerator {
        fn new(result: fn() -> Result<String, GenerateError>) -> Self {
            Self {
                result,
                calls: AtomicUsize::new(0),
                last_prompt: std::sync::Mutex::new(String::new()),
            }
        }
    }

    #[async_trait]
    impl Generator for FakeGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = prompt.to_string();
            (self.result)()
        }
    }

    fn setup(
        result: fn() -> Result<String, GenerateError>,
    ) -> (tempfile::TempDir, Workspace, Arc<FakeGenerator>, ChunkProcessor) {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path().join("temp"));
        workspace.init().unwrap();
        let generator = Arc::new(FakeGenerator::new(result));
        let processor = ChunkProcessor::new(
            generator.clone(),
            workspace.clone(),
            "Reformat the text.",
        );
        (dir, workspace, generator, processor)
    }

    #[tokio::test]
    async fn test_success_is_persisted_under_chunk_name() {
        let (_dir, workspace, generator, processor) =
            setup(|| Ok("cleaned up text".to_string()));

        let chunk = workspace.chunk_path(1);
        std::fs::write(&chunk, "raw words").unwrap();

        let text = processor.process(&chunk, &CancelToken::new()).await;
        assert_eq!(text, "cleaned up text");
        assert_eq!(
            std::fs::read_to_string(workspace.processed_path("chunk_1.txt")).unwrap(),
            "cleaned up text"
        );

        let prompt = generator.last_prompt.lock().unwrap().clone();
        assert!(prompt.starts_with("Processing Instruction:\nReformat the text."));
        assert!(prompt.ends_with("raw words"));
    }

    #[tokio::test]
    async fn test_endpoint_error_becomes_placeholder() {
        let (_dir, workspace, _generator, processor) =
            setup(|| Err(GenerateError::Request("connection refused".to_string())));

        let chunk = workspace.chunk_path(1);
        std::fs::write(&chunk, "raw words").unwrap();

        let text = processor.process(&chunk, &CancelToken::new()).await;
        assert!(text.starts_with("[Error processing chunk:"));
        assert!(text.contains("connection refused"));
        // Placeholder text is persisted, not dropped.
        assert_eq!(
            std::fs::read_to_string(workspace.processed_path("chunk_1.txt")).unwrap(),
            text
        );
    }

    #[tokio::test]
    async fn test_empty_response_has_dedicated_placeholder() {
        let (_dir, workspace, _generator, processor) =
            setup(|| Err(GenerateError::EmptyResponse));

        let chunk = workspace.chunk_path(1);
        std::fs::write(&chunk, "raw words").unwrap();

        let text = processor.process(&chunk, &CancelToken::new()).await;
        assert_eq!(text, "[Unable to fetch transcript or response is empty]");
    }

    #[tokio::test]
    async fn test_cancel_skips_generation_entirely() {
        let (_dir, workspace, generator, processor) = setup(|| Ok("unused".to_string()));

        let chunk = workspace.chunk_path(1);
        std::fs::write(&chunk, "raw words").unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();

        let text = processor.process(&chunk, &cancel).await;
        assert_eq!(text, "[Generation cancelled]");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unreadable_chunk_becomes_placeholder() {
        let (_dir, workspace, generator, processor) = setup(|| Ok("unused".to_string()));

        let text = processor
            .process(&workspace.chunk_path(99), &CancelToken::new())
            .await;
        assert!(text.starts_with("[Error processing chunk:"));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }
}
