//! Pipeline controller.
//!
//! Drives the linear sequence fetch -> split -> process(1..N) -> (wait for
//! user) -> combine, exposing a small state machine and observer hooks so
//! any presentation layer can follow along without participating.

mod cancel;

pub use cancel::CancelToken;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::chunking::Chunker;
use crate::combine::Combiner;
use crate::config::Settings;
use crate::error::{Result, YttpError};
use crate::generate::{ChunkProcessor, Generator, OllamaClient};
use crate::transcript::{TranscriptFetcher, TranscriptSource, YoutubeCaptionSource};
use crate::workspace::Workspace;

/// Pipeline run states, in the order a successful run visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Fetching,
    Splitting,
    Processing { current: usize, total: usize },
    AwaitingCombine,
    Combining,
    Cancelled,
    Failed,
}

/// Observer hooks for the presentation layer. All methods default to
/// no-ops so observers implement only what they need.
pub trait PipelineObserver: Send + Sync {
    fn state_changed(&self, _state: &PipelineState) {}
    fn chunk_started(&self, _index: usize, _total: usize) {}
    fn chunk_completed(&self, _index: usize, _total: usize, _text: &str) {}
}

/// Observer that ignores everything.
pub struct NullObserver;

impl PipelineObserver for NullObserver {}

/// Result of a completed (non-cancelled) pipeline run.
#[derive(Debug)]
pub struct RunSummary {
    pub video_id: String,
    pub chunks_processed: usize,
}

/// The pipeline controller.
///
/// One controller drives at most one run at a time; all steps are
/// sequential awaits, so no two generation requests are ever in flight
/// together.
pub struct Pipeline {
    settings: Settings,
    workspace: Workspace,
    source: Arc<dyn TranscriptSource>,
    generator: Arc<dyn Generator>,
    cancel: CancelToken,
    state: PipelineState,
    config_path: PathBuf,
}

impl Pipeline {
    /// Create a pipeline with the real collaborators, rooted in the
    /// working directory. Settings written by the pipeline go back to
    /// `config_path`.
    pub fn new(settings: Settings, config_path: PathBuf) -> Result<Self> {
        let source = Arc::new(YoutubeCaptionSource::new());
        let generator = Arc::new(OllamaClient::new(
            &settings.ollama_host,
            &settings.ollama_model,
        ));
        Self::with_components(
            settings,
            Workspace::new(Workspace::default_root()),
            source,
            generator,
            config_path,
        )
    }

    /// Create a pipeline with custom collaborators (used by tests).
    pub fn with_components(
        settings: Settings,
        workspace: Workspace,
        source: Arc<dyn TranscriptSource>,
        generator: Arc<dyn Generator>,
        config_path: PathBuf,
    ) -> Result<Self> {
        settings.validate()?;
        workspace.init()?;

        Ok(Self {
            settings,
            workspace,
            source,
            generator,
            cancel: CancelToken::new(),
            state: PipelineState::Idle,
            config_path,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Token the presentation layer uses to request cancellation.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Combiner over this pipeline's workspace and settings, for output
    /// naming decisions in the presentation layer.
    pub fn combiner(&self) -> Combiner {
        Combiner::new(self.workspace.clone(), &self.settings)
    }

    /// Clear the temp workspace.
    pub fn reset_workspace(&self) -> Result<()> {
        self.workspace.reset()
    }

    fn set_state(&mut self, state: PipelineState, observer: &dyn PipelineObserver) {
        self.state = state;
        observer.state_changed(&state);
    }

    /// Run fetch, split, and sequential chunk processing for `url`,
    /// stopping in `AwaitingCombine`.
    ///
    /// Cancellation surfaces as `Err(Cancelled)`; both cancellation and
    /// terminal errors clear the workspace before returning.
    pub async fn run(
        &mut self,
        url: &str,
        observer: &dyn PipelineObserver,
    ) -> Result<RunSummary> {
        match self.run_inner(url, observer).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                let terminal = if matches!(e, YttpError::Cancelled) {
                    PipelineState::Cancelled
                } else {
                    PipelineState::Failed
                };
                self.set_state(terminal, observer);
                if let Err(reset_err) = self.workspace.reset() {
                    warn!("Failed to clear workspace after run: {}", reset_err);
                }
                Err(e)
            }
        }
    }

    async fn run_inner(
        &mut self,
        url: &str,
        observer: &dyn PipelineObserver,
    ) -> Result<RunSummary> {
        // A fresh run owns the workspace; drop anything a prior run left.
        self.workspace.reset()?;

        self.set_state(PipelineState::Fetching, observer);
        let fetcher = TranscriptFetcher::new(
            self.source.clone(),
            self.workspace.clone(),
            self.settings.retry_count,
            self.config_path.clone(),
        );
        let (transcript_path, video_id) = fetcher
            .fetch(url, &mut self.settings, &self.cancel)
            .await?;

        self.set_state(PipelineState::Splitting, observer);
        let chunker = Chunker::new(
            self.workspace.clone(),
            self.settings.chunk_size,
            self.settings.chunk_overlap,
        )?;
        let chunk_files = chunker.split(&transcript_path)?;
        let total = chunk_files.len();
        info!("Processing {} chunks for {}", total, video_id);

        let processor = ChunkProcessor::new(
            self.generator.clone(),
            self.workspace.clone(),
            &self.settings.processing_prompt,
        );

        let mut chunks_processed = 0;
        for (i, chunk_file) in chunk_files.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(YttpError::Cancelled);
            }

            let index = i + 1;
            self.set_state(PipelineState::Processing { current: index, total }, observer);
            observer.chunk_started(index, total);

            let text = processor.process(chunk_file, &self.cancel).await;
            observer.chunk_completed(index, total, &text);
            chunks_processed += 1;
        }

        if self.cancel.is_cancelled() {
            return Err(YttpError::Cancelled);
        }

        // Record the default output name for the combine step.
        self.settings.inline_output_name = video_id.clone();
        self.settings.save_to(&self.config_path)?;

        self.set_state(PipelineState::AwaitingCombine, observer);
        Ok(RunSummary {
            video_id,
            chunks_processed,
        })
    }

    /// Combine the processed chunks into `dest` and clear the workspace.
    ///
    /// The workspace is cleared after the attempt whether it succeeded or
    /// not; a combine attempt is a terminal event for the run.
    pub fn combine(&mut self, dest: &Path, observer: &dyn PipelineObserver) -> Result<PathBuf> {
        self.set_state(PipelineState::Combining, observer);
        let result = self.combiner().combine(dest);

        if let Err(e) = self.workspace.reset() {
            warn!("Failed to clear workspace after combine: {}", e);
        }

        match &result {
            Ok(_) => self.set_state(PipelineState::Idle, observer),
            Err(_) => self.set_state(PipelineState::Failed, observer),
        }
        result
    }

    /// Persist the user's chosen output name so the next combine
    /// defaults to it.
    pub fn record_inline_output_name(&mut self, name: &str) -> Result<()> {
        self.settings.inline_output_name = name.trim().to_string();
        self.settings.save_to(&self.config_path)
    }
}
