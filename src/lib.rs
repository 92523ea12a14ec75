//! yttp - YouTube Transcript Processor
//!
//! A CLI tool that fetches a YouTube video's transcript, splits it into
//! overlapping word-count chunks, reformats each chunk with a locally
//! hosted LLM (Ollama), and combines the results into a document.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Settings loading, validation, and persistence
//! - `workspace` - Temp file layout and lifecycle
//! - `transcript` - Video id extraction and transcript retrieval
//! - `chunking` - Overlapping word-window chunking
//! - `generate` - Generation endpoint client and per-chunk processing
//! - `combine` - Final document assembly (txt or docx)
//! - `pipeline` - Pipeline controller and cancellation
//!
//! # Example
//!
//! ```rust,no_run
//! use yttp::config::Settings;
//! use yttp::pipeline::{NullObserver, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let mut pipeline = Pipeline::new(settings, Settings::default_config_path())?;
//!
//!     let summary = pipeline
//!         .run("https://youtu.be/dQw4w9WgXcQ", &NullObserver)
//!         .await?;
//!     println!("Processed {} chunks", summary.chunks_processed);
//!
//!     pipeline.combine(std::path::Path::new("outputs/out.docx"), &NullObserver)?;
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod combine;
pub mod config;
pub mod error;
pub mod generate;
pub mod pipeline;
pub mod transcript;
pub mod workspace;

pub use error::{Result, YttpError};
