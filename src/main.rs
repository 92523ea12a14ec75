//! yttp CLI entry point.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use yttp::cli::{commands, Cli, Commands};
use yttp::config::Settings;
use yttp::workspace::Workspace;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("yttp={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let config_path = match &cli.config {
        Some(path) => PathBuf::from(path),
        None => Settings::default_config_path(),
    };
    let settings = Settings::load_from(&config_path)?;

    // Ensure the workspace and output directories exist
    Workspace::new(Workspace::default_root()).init()?;
    std::fs::create_dir_all("outputs")?;

    // Execute command
    match &cli.command {
        Commands::Run { url, output, yes } => {
            commands::run_run(url, output.clone(), *yes, settings, config_path).await?;
        }

        Commands::Combine { output } => {
            commands::run_combine(output.clone(), settings, config_path).await?;
        }

        Commands::Clean => {
            commands::run_clean()?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, &config_path).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, &config_path)?;
        }
    }

    Ok(())
}
