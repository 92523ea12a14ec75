//! Combine processed chunks into the final document.

use std::path::{Path, PathBuf};

use docx_rs::{AlignmentType, Docx, Paragraph, Run};
use tracing::info;

use crate::config::Settings;
use crate::error::{Result, YttpError};
use crate::workspace::Workspace;

/// Assembles the processed chunk files into one `.txt` or `.docx`
/// document.
pub struct Combiner {
    workspace: Workspace,
    skip_manual_name: bool,
    inline_output_name: String,
    include_docx_title: bool,
    title_font_size: u32,
    custom_title: String,
}

impl Combiner {
    pub fn new(workspace: Workspace, settings: &Settings) -> Self {
        Self {
            workspace,
            skip_manual_name: settings.skip_manual_name,
            inline_output_name: settings.inline_output_name.trim().to_string(),
            include_docx_title: settings.include_docx_title,
            title_font_size: settings.title_font_size,
            custom_title: settings.custom_title.trim().to_string(),
        }
    }

    /// Default output file stem: the user's inline name when one is set,
    /// else the video id. `skip_manual_name` forces the video id.
    pub fn default_output_name(&self, video_id: &str) -> String {
        if self.skip_manual_name || self.inline_output_name.is_empty() {
            video_id.to_string()
        } else {
            self.inline_output_name.clone()
        }
    }

    /// Whether the caller should prompt the user for a name at all.
    pub fn wants_name_prompt(&self) -> bool {
        !self.skip_manual_name
    }

    /// Combine all processed chunks into `dest`, in file-name order.
    ///
    /// Fails with `NoProcessedChunks` (and writes nothing) when the
    /// processed directory is empty. The output form follows the
    /// destination extension: `.txt` gets blank-line-joined plain text,
    /// anything else gets a DOCX document.
    pub fn combine(&self, dest: &Path) -> Result<PathBuf> {
        let files = self.workspace.list_processed()?;
        if files.is_empty() {
            return Err(YttpError::NoProcessedChunks);
        }

        let is_txt = dest
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
        if is_txt {
            self.write_txt(&files, dest)?;
        } else {
            self.write_docx(&files, dest)?;
        }

        info!("Combined {} chunks into {}", files.len(), dest.display());
        Ok(dest.to_path_buf())
    }

    fn write_txt(&self, files: &[PathBuf], dest: &Path) -> Result<()> {
        let mut blocks = Vec::with_capacity(files.len());
        for file in files {
            blocks.push(read_with_fallback(file)?);
        }
        std::fs::write(dest, blocks.join("\n\n"))
            .map_err(|e| YttpError::Combine(e.to_string()))?;
        Ok(())
    }

    fn write_docx(&self, files: &[PathBuf], dest: &Path) -> Result<()> {
        let mut doc = Docx::new();

        if self.include_docx_title {
            let title = if self.custom_title.is_empty() {
                dest.file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default()
            } else {
                self.custom_title.clone()
            };

            // Run sizes are half-points.
            doc = doc
                .add_paragraph(
                    Paragraph::new().align(AlignmentType::Center).add_run(
                        Run::new()
                            .add_text(title)
                            .size(self.title_font_size as usize * 2),
                    ),
                )
                .add_paragraph(Paragraph::new());
        }

        for file in files {
            let content = read_with_fallback(file)?;
            doc = doc
                .add_paragraph(Paragraph::new().add_run(Run::new().add_text(content)))
                .add_paragraph(Paragraph::new());
        }

        let file = std::fs::File::create(dest).map_err(|e| YttpError::Combine(e.to_string()))?;
        doc.build()
            .pack(file)
            .map_err(|e| YttpError::Combine(e.to_string()))?;
        Ok(())
    }
}

/// Read a processed chunk as UTF-8, falling back to Latin-1.
///
/// Latin-1 maps every byte to a char, so the fallback itself cannot fail;
/// only the initial read can.
fn read_with_fallback(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| YttpError::Combine(e.to_string()))?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => Ok(e.into_bytes().iter().map(|&b| b as char).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(settings: &Settings) -> (tempfile::TempDir, Workspace, Combiner) {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path().join("temp"));
        workspace.init().unwrap();
        let combiner = Combiner::new(workspace.clone(), settings);
        (dir, workspace, combiner)
    }

    #[test]
    fn test_empty_processed_dir_fails_without_writing() {
        let settings = Settings::default();
        let (dir, _workspace, combiner) = setup(&settings);

        let dest = dir.path().join("out.txt");
        let err = combiner.combine(&dest).unwrap_err();
        assert!(matches!(err, YttpError::NoProcessedChunks));
        assert!(!dest.exists());
    }

    #[test]
    fn test_txt_output_has_blank_line_separated_blocks_in_order() {
        let settings = Settings::default();
        let (dir, workspace, combiner) = setup(&settings);

        std::fs::write(workspace.processed_path("chunk_2.txt"), "second").unwrap();
        std::fs::write(workspace.processed_path("chunk_1.txt"), "first").unwrap();
        std::fs::write(workspace.processed_path("chunk_3.txt"), "third").unwrap();

        let dest = dir.path().join("out.txt");
        combiner.combine(&dest).unwrap();

        assert_eq!(
            std::fs::read_to_string(&dest).unwrap(),
            "first\n\nsecond\n\nthird"
        );
    }

    #[test]
    fn test_txt_output_decodes_latin1_fallback() {
        let settings = Settings::default();
        let (dir, workspace, combiner) = setup(&settings);

        // "café" in Latin-1: the 0xE9 byte is invalid UTF-8.
        std::fs::write(workspace.processed_path("chunk_1.txt"), b"caf\xe9").unwrap();

        let dest = dir.path().join("out.txt");
        combiner.combine(&dest).unwrap();
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "café");
    }

    #[test]
    fn test_docx_output_is_written() {
        let settings = Settings::default();
        let (dir, workspace, combiner) = setup(&settings);

        std::fs::write(workspace.processed_path("chunk_1.txt"), "content").unwrap();

        let dest = dir.path().join("out.docx");
        combiner.combine(&dest).unwrap();
        // DOCX files are zip archives; check the magic bytes.
        let bytes = std::fs::read(&dest).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_default_output_name_prefers_inline_name() {
        let mut settings = Settings::default();
        settings.inline_output_name = "my notes".to_string();
        let (_dir, _workspace, combiner) = setup(&settings);

        assert_eq!(combiner.default_output_name("vid123"), "my notes");
    }

    #[test]
    fn test_default_output_name_falls_back_to_video_id() {
        let settings = Settings::default();
        let (_dir, _workspace, combiner) = setup(&settings);
        assert_eq!(combiner.default_output_name("vid123"), "vid123");
    }

    #[test]
    fn test_skip_manual_name_forces_video_id() {
        let mut settings = Settings::default();
        settings.skip_manual_name = true;
        settings.inline_output_name = "ignored".to_string();
        let (_dir, _workspace, combiner) = setup(&settings);

        assert_eq!(combiner.default_output_name("vid123"), "vid123");
        assert!(!combiner.wants_name_prompt());
    }
}
