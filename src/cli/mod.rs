//! CLI module for yttp.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// yttp - YouTube Transcript Processor
///
/// Fetches a video transcript, reformats it chunk by chunk with a locally
/// hosted LLM, and combines the results into a document.
#[derive(Parser, Debug)]
#[command(name = "yttp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch, split, and process a video's transcript
    Run {
        /// YouTube video URL (youtube.com/watch?v=... or youtu.be/...)
        url: String,

        /// Write the combined document to this path instead of asking
        #[arg(short, long)]
        output: Option<String>,

        /// Accept the default output name without prompting
        #[arg(short, long)]
        yes: bool,
    },

    /// Combine the processed chunks of the last run into a document
    Combine {
        /// Write the combined document to this path instead of asking
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Clear the temp workspace
    Clean,

    /// Check configuration and the generation endpoint
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "chunk_size")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Show configuration file path
    Path,
}
