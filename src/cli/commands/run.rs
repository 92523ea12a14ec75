//! Run command implementation: the full fetch/split/process/combine flow.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use indicatif::ProgressBar;

use super::combine::resolve_output_path;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::YttpError;
use crate::pipeline::{Pipeline, PipelineObserver, PipelineState};

/// Observer that renders pipeline progress on the terminal: a spinner
/// while work is in flight, and the typewriter effect for each chunk's
/// response.
struct CliObserver {
    spinner: Mutex<Option<ProgressBar>>,
    typewriter_speed: u64,
}

impl CliObserver {
    fn new(typewriter_speed: u64) -> Self {
        Self {
            spinner: Mutex::new(None),
            typewriter_speed,
        }
    }

    fn set_spinner(&self, msg: &str) {
        let mut slot = self.spinner.lock().unwrap();
        if let Some(pb) = slot.take() {
            pb.finish_and_clear();
        }
        *slot = Some(Output::spinner(msg));
    }

    fn clear_spinner(&self) {
        if let Some(pb) = self.spinner.lock().unwrap().take() {
            pb.finish_and_clear();
        }
    }
}

impl PipelineObserver for CliObserver {
    fn state_changed(&self, state: &PipelineState) {
        match state {
            PipelineState::Fetching => self.set_spinner("Fetching transcript..."),
            PipelineState::Splitting => {
                self.clear_spinner();
                Output::info("Splitting transcript into chunks...");
            }
            PipelineState::Combining => self.set_spinner("Combining chunks..."),
            PipelineState::Idle
            | PipelineState::AwaitingCombine
            | PipelineState::Cancelled
            | PipelineState::Failed => self.clear_spinner(),
            PipelineState::Processing { .. } => {}
        }
    }

    fn chunk_started(&self, index: usize, total: usize) {
        self.set_spinner(&format!("Processing chunk {}/{}...", index, total));
    }

    fn chunk_completed(&self, index: usize, total: usize, text: &str) {
        self.clear_spinner();
        Output::chunk_header(index, total);
        Output::typewriter(text, self.typewriter_speed);
    }
}

/// Run the full pipeline for one video URL.
pub async fn run_run(
    url: &str,
    output: Option<String>,
    yes: bool,
    settings: Settings,
    config_path: PathBuf,
) -> Result<()> {
    if !url.contains("youtube.com") && !url.contains("youtu.be") {
        Output::error("Invalid YouTube URL format.");
        anyhow::bail!("invalid URL: {}", url);
    }

    let mut pipeline = Pipeline::new(settings, config_path)?;
    let observer = CliObserver::new(pipeline.settings().typewriter_speed);

    // Ctrl-C requests cooperative cancellation; the chunk in flight is
    // allowed to finish its round-trip.
    let cancel = pipeline.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
            Output::warning("Cancelling after the current chunk...");
        }
    });

    let summary = match pipeline.run(url, &observer).await {
        Ok(summary) => summary,
        Err(YttpError::Cancelled) => {
            Output::warning("Processing cancelled.");
            return Ok(());
        }
        Err(e) => {
            Output::error(&e.to_string());
            return Err(e.into());
        }
    };

    Output::success(&format!(
        "Processing complete: {} chunks for {}.",
        summary.chunks_processed, summary.video_id
    ));

    let dest = resolve_output_path(&mut pipeline, &summary.video_id, output, yes)?;
    match pipeline.combine(&dest, &observer) {
        Ok(path) => {
            Output::success(&format!("File saved at {}", path.display()));
            Ok(())
        }
        Err(e) => {
            Output::error(&e.to_string());
            Err(e.into())
        }
    }
}
