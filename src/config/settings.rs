//! Configuration settings for yttp.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{Result, YttpError};

/// Output document format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Word-processor document with optional title block.
    #[default]
    Docx,
    /// Plain text, chunks separated by a blank line.
    Txt,
}

impl OutputFormat {
    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Docx => "docx",
            OutputFormat::Txt => "txt",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "docx" => Ok(OutputFormat::Docx),
            "txt" => Ok(OutputFormat::Txt),
            _ => Err(format!("Unknown output format: {} (expected docx or txt)", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Flat application settings, persisted as a single JSON object.
///
/// Missing keys are filled from defaults on load; keys this version does
/// not know about are carried in `extra` and written back on save.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Chunk window size in words.
    pub chunk_size: u32,
    /// Overlap between consecutive chunks in words. Must be < chunk_size.
    pub chunk_overlap: u32,
    /// Base URL of the Ollama server.
    pub ollama_host: String,
    /// Model name passed to the generation endpoint.
    pub ollama_model: String,
    /// Instruction sent to the model ahead of each chunk.
    pub processing_prompt: String,
    /// Output document format.
    pub output_format: OutputFormat,
    /// Always name the output after the video id, without prompting.
    pub skip_manual_name: bool,
    /// Video id of the most recent successful fetch.
    pub last_video_id: String,
    /// User-entered output name for the next combine.
    pub inline_output_name: String,
    /// Prepend a title paragraph to DOCX output.
    pub include_docx_title: bool,
    /// Title size in points.
    pub title_font_size: u32,
    /// Title text override. Empty means use the output file stem.
    pub custom_title: String,
    /// Additional transcript fetch attempts after the first failure.
    pub retry_count: u32,
    /// Typewriter display delay in milliseconds per character. 0 disables.
    pub typewriter_speed: u64,

    /// Keys from the settings file this version does not recognize.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chunk_size: 300,
            chunk_overlap: 50,
            ollama_host: "http://localhost:11434".to_string(),
            ollama_model: "deepseek-r1".to_string(),
            processing_prompt:
                "Check and reformat the text for grammar, clarity, and proper structure."
                    .to_string(),
            output_format: OutputFormat::Docx,
            skip_manual_name: false,
            last_video_id: String::new(),
            inline_output_name: String::new(),
            include_docx_title: true,
            title_font_size: 16,
            custom_title: String::new(),
            retry_count: 3,
            typewriter_speed: 2,
            extra: serde_json::Map::new(),
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_config_path())
    }

    /// Load settings from a specific path.
    ///
    /// A missing file yields the defaults. A file that fails to decode is
    /// treated the same way (with a warning) so startup never fails on a
    /// corrupt settings file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Settings::default());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                warn!("Ignoring unreadable settings file {}: {}", path.display(), e);
                Ok(Settings::default())
            }
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save the complete settings mapping to a specific path, overwriting.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default configuration file path, relative to the working directory.
    pub fn default_config_path() -> PathBuf {
        PathBuf::from("config.json")
    }

    /// Check that the chunk geometry can make progress.
    ///
    /// A zero chunk size or an overlap at or above the chunk size would
    /// stall the window advance, so both are rejected here rather than at
    /// split time.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(YttpError::Config("chunk_size must be positive".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(YttpError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    /// Apply a single `key = value` mutation from the config CLI.
    ///
    /// Numeric and boolean fields reject unparseable values without
    /// touching the settings; unknown keys are rejected outright.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "chunk_size" => self.chunk_size = parse_u32(key, value)?,
            "chunk_overlap" => self.chunk_overlap = parse_u32(key, value)?,
            "retry_count" => self.retry_count = parse_u32(key, value)?,
            "title_font_size" => self.title_font_size = parse_u32(key, value)?,
            "typewriter_speed" => {
                self.typewriter_speed = value.trim().parse().map_err(|_| {
                    YttpError::InvalidInput(format!("{} must be an integer, got '{}'", key, value))
                })?
            }
            "ollama_host" => self.ollama_host = value.trim().to_string(),
            "ollama_model" => self.ollama_model = value.trim().to_string(),
            "processing_prompt" => self.processing_prompt = value.trim().to_string(),
            "custom_title" => self.custom_title = value.trim().to_string(),
            "inline_output_name" => self.inline_output_name = value.trim().to_string(),
            "output_format" => {
                self.output_format = value.parse().map_err(YttpError::InvalidInput)?
            }
            "skip_manual_name" => self.skip_manual_name = parse_bool(key, value)?,
            "include_docx_title" => self.include_docx_title = parse_bool(key, value)?,
            _ => {
                return Err(YttpError::InvalidInput(format!(
                    "Unknown setting: {}",
                    key
                )))
            }
        }
        Ok(())
    }
}

fn parse_u32(key: &str, value: &str) -> Result<u32> {
    value.trim().parse().map_err(|_| {
        YttpError::InvalidInput(format!("{} must be an integer, got '{}'", key, value))
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(YttpError::InvalidInput(format!(
            "{} must be true or false, got '{}'",
            key, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_merges_over_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"chunk_size": 500}"#).unwrap();

        assert_eq!(settings.chunk_size, 500);
        assert_eq!(settings.chunk_overlap, 50);
        assert_eq!(settings.retry_count, 3);
        assert_eq!(settings.output_format, OutputFormat::Docx);
    }

    #[test]
    fn test_unknown_keys_survive_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let settings: Settings =
            serde_json::from_str(r#"{"chunk_size": 120, "future_option": "kept"}"#).unwrap();
        settings.save_to(&path).unwrap();

        let reloaded = Settings::load_from(&path).unwrap();
        assert_eq!(reloaded.chunk_size, 120);
        assert_eq!(
            reloaded.extra.get("future_option").and_then(|v| v.as_str()),
            Some("kept")
        );
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings.chunk_size, 300);
    }

    #[test]
    fn test_corrupt_file_falls_open_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.chunk_size, 300);
    }

    #[test]
    fn test_validate_rejects_bad_geometry() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_ok());

        settings.chunk_overlap = settings.chunk_size;
        assert!(settings.validate().is_err());

        settings.chunk_size = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_apply_rejects_non_numeric() {
        let mut settings = Settings::default();
        let before = settings.chunk_size;

        let err = settings.apply("chunk_size", "lots").unwrap_err();
        assert!(matches!(err, YttpError::InvalidInput(_)));
        assert_eq!(settings.chunk_size, before);
    }

    #[test]
    fn test_apply_known_keys() {
        let mut settings = Settings::default();
        settings.apply("chunk_size", "400").unwrap();
        settings.apply("output_format", "txt").unwrap();
        settings.apply("skip_manual_name", "true").unwrap();

        assert_eq!(settings.chunk_size, 400);
        assert_eq!(settings.output_format, OutputFormat::Txt);
        assert!(settings.skip_manual_name);
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("docx".parse::<OutputFormat>().unwrap(), OutputFormat::Docx);
        assert_eq!("TXT".parse::<OutputFormat>().unwrap(), OutputFormat::Txt);
        assert!("pdf".parse::<OutputFormat>().is_err());
    }
}
