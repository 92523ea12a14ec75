//! Doctor command implementation.

use std::path::Path;

use anyhow::Result;

use crate::cli::Output;
use crate::config::Settings;
use crate::generate::OllamaClient;

/// Check configuration and the generation endpoint.
pub async fn run_doctor(settings: &Settings, config_path: &Path) -> Result<()> {
    Output::header("yttp doctor");

    let mut problems = 0;

    if config_path.exists() {
        Output::kv("Config file", &config_path.display().to_string());
    } else {
        Output::kv(
            "Config file",
            &format!("{} (not created yet, using defaults)", config_path.display()),
        );
    }

    Output::kv(
        "Chunking",
        &format!(
            "{} words, {} overlap",
            settings.chunk_size, settings.chunk_overlap
        ),
    );
    if let Err(e) = settings.validate() {
        Output::error(&e.to_string());
        problems += 1;
    }

    Output::kv("Ollama host", &settings.ollama_host);
    Output::kv("Ollama model", &settings.ollama_model);

    let client = OllamaClient::new(&settings.ollama_host, &settings.ollama_model);
    match client.check_reachable().await {
        Ok(()) => Output::success("Ollama server is reachable."),
        Err(e) => {
            Output::error(&format!("Ollama server is not reachable: {}", e));
            Output::info("Start it with 'ollama serve' or set ollama_host.");
            problems += 1;
        }
    }

    if problems == 0 {
        Output::success("All checks passed.");
        Ok(())
    } else {
        anyhow::bail!("{} problem(s) found", problems);
    }
}
