//! Configuration module for yttp.
//!
//! Handles loading, validating, and persisting application settings.

mod settings;

pub use settings::{OutputFormat, Settings};
