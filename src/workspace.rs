//! Temp workspace layout and lifecycle.
//!
//! The workspace holds everything the currently running pipeline produces:
//! the raw transcript, the chunk files, and the processed chunk files, each
//! in its own subdirectory. Its contents belong to exactly one run; `reset`
//! is called before a new run starts and after any terminal event so stale
//! files never leak into a later combine.

use std::path::{Path, PathBuf};

use crate::error::Result;

const TRANSCRIPTS_SUBDIR: &str = "yt_trans";
const CHUNKS_SUBDIR: &str = "yt_chunks";
const PROCESSED_SUBDIR: &str = "yt_pro";

/// Filesystem layout for one pipeline run.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create a workspace rooted at `root`. No directories are touched
    /// until `init` is called.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Default workspace root, relative to the working directory.
    pub fn default_root() -> PathBuf {
        PathBuf::from("temp")
    }

    /// Create the root and the three subdirectories. Idempotent.
    pub fn init(&self) -> Result<()> {
        std::fs::create_dir_all(self.transcripts_dir())?;
        std::fs::create_dir_all(self.chunks_dir())?;
        std::fs::create_dir_all(self.processed_dir())?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn transcripts_dir(&self) -> PathBuf {
        self.root.join(TRANSCRIPTS_SUBDIR)
    }

    pub fn chunks_dir(&self) -> PathBuf {
        self.root.join(CHUNKS_SUBDIR)
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.root.join(PROCESSED_SUBDIR)
    }

    /// Path for the raw transcript of `video_id`.
    pub fn transcript_path(&self, video_id: &str) -> PathBuf {
        self.transcripts_dir()
            .join(format!("{}_transcript.txt", video_id))
    }

    /// Path for chunk number `index` (1-based).
    pub fn chunk_path(&self, index: usize) -> PathBuf {
        self.chunks_dir().join(format!("chunk_{}.txt", index))
    }

    /// Path in the processed directory mirroring a chunk file name.
    pub fn processed_path(&self, chunk_file_name: &str) -> PathBuf {
        self.processed_dir().join(chunk_file_name)
    }

    /// All processed `.txt` files in chunk order.
    ///
    /// Ordering is by the trailing chunk number, not lexicographic, so
    /// `chunk_10.txt` comes after `chunk_2.txt`.
    pub fn list_processed(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(self.processed_dir())? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
                files.push(path);
            }
        }
        files.sort_by_key(|p| (chunk_number(p), p.clone()));
        Ok(files)
    }

    /// Delete every file inside the three subdirectories, leaving the
    /// directories themselves in place. Idempotent; missing directories
    /// are skipped.
    pub fn reset(&self) -> Result<()> {
        for dir in [self.transcripts_dir(), self.chunks_dir(), self.processed_dir()] {
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            for entry in entries {
                let path = entry?.path();
                if path.is_file() {
                    std::fs::remove_file(&path)?;
                }
            }
        }
        Ok(())
    }
}

/// Trailing number of a `chunk_{n}.txt` file name. Files without one
/// sort after all numbered chunks.
fn chunk_number(path: &Path) -> u64 {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.rsplit('_').next())
        .and_then(|n| n.parse().ok())
        .unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_workspace() -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path().join("temp"));
        workspace.init().unwrap();
        (dir, workspace)
    }

    #[test]
    fn test_init_is_idempotent() {
        let (_dir, workspace) = temp_workspace();
        workspace.init().unwrap();
        assert!(workspace.chunks_dir().is_dir());
    }

    #[test]
    fn test_reset_removes_files_but_keeps_dirs() {
        let (_dir, workspace) = temp_workspace();

        std::fs::write(workspace.transcript_path("abc123"), "text").unwrap();
        std::fs::write(workspace.chunk_path(1), "chunk").unwrap();
        std::fs::write(workspace.processed_path("chunk_1.txt"), "done").unwrap();

        workspace.reset().unwrap();

        for dir in [
            workspace.transcripts_dir(),
            workspace.chunks_dir(),
            workspace.processed_dir(),
        ] {
            assert!(dir.is_dir());
            assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
        }
    }

    #[test]
    fn test_reset_is_safe_when_already_empty() {
        let (_dir, workspace) = temp_workspace();
        workspace.reset().unwrap();
        workspace.reset().unwrap();
    }

    #[test]
    fn test_list_processed_sorted_by_chunk_number() {
        let (_dir, workspace) = temp_workspace();

        std::fs::write(workspace.processed_path("chunk_10.txt"), "j").unwrap();
        std::fs::write(workspace.processed_path("chunk_2.txt"), "b").unwrap();
        std::fs::write(workspace.processed_path("chunk_1.txt"), "a").unwrap();
        std::fs::write(workspace.processed_path("notes.md"), "skip").unwrap();

        let files = workspace.list_processed().unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["chunk_1.txt", "chunk_2.txt", "chunk_10.txt"]);
    }
}
