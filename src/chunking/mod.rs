//! Overlapping word-window chunking.
//!
//! Splits a transcript into fixed-size word windows where consecutive
//! windows share `chunk_overlap` words, and materializes each window as a
//! numbered file in the workspace.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, YttpError};
use crate::workspace::Workspace;

/// Word-window chunker.
#[derive(Debug, Clone)]
pub struct Chunker {
    workspace: Workspace,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Chunker {
    /// Create a chunker, rejecting geometry that cannot make progress.
    ///
    /// The window start advances by `chunk_size - chunk_overlap` per step;
    /// a zero or negative advance would loop forever, so it is refused
    /// here instead.
    pub fn new(workspace: Workspace, chunk_size: u32, chunk_overlap: u32) -> Result<Self> {
        if chunk_size == 0 {
            return Err(YttpError::Config("chunk_size must be positive".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(YttpError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            workspace,
            chunk_size: chunk_size as usize,
            chunk_overlap: chunk_overlap as usize,
        })
    }

    /// Compute the chunk texts for `content` without touching the
    /// filesystem.
    ///
    /// Windows start at word offset 0 and advance by
    /// `chunk_size - chunk_overlap`; the final window is clamped to the
    /// total word count, so the last chunk may be shorter.
    pub fn split_words(&self, content: &str) -> Vec<String> {
        let words: Vec<&str> = content.split_whitespace().collect();
        let step = self.chunk_size - self.chunk_overlap;

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < words.len() {
            let end = (start + self.chunk_size).min(words.len());
            chunks.push(words[start..end].join(" "));
            start += step;
        }
        chunks
    }

    /// Split the transcript file into numbered chunk files.
    ///
    /// Chunk indices start at 1 and are contiguous. Any I/O failure is
    /// wrapped in a `Split` error carrying the original cause.
    pub fn split(&self, transcript_path: &Path) -> Result<Vec<PathBuf>> {
        let content = std::fs::read_to_string(transcript_path)
            .map_err(|e| YttpError::Split(e.to_string()))?;

        let mut chunk_files = Vec::new();
        for (i, chunk_text) in self.split_words(&content).into_iter().enumerate() {
            let path = self.workspace.chunk_path(i + 1);
            std::fs::write(&path, chunk_text).map_err(|e| YttpError::Split(e.to_string()))?;
            chunk_files.push(path);
        }

        debug!(
            "Split transcript into {} chunks (size {}, overlap {})",
            chunk_files.len(),
            self.chunk_size,
            self.chunk_overlap
        );
        Ok(chunk_files)
    }
}
