//! Combine command implementation.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;

use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::{NullObserver, Pipeline};

/// Combine the processed chunks of the last run into a document.
pub async fn run_combine(
    output: Option<String>,
    settings: Settings,
    config_path: PathBuf,
) -> Result<()> {
    let video_id = settings.last_video_id.clone();
    if video_id.is_empty() {
        Output::error("No previous run found. Use 'yttp run <url>' first.");
        anyhow::bail!("nothing to combine");
    }

    let mut pipeline = Pipeline::new(settings, config_path)?;
    let dest = resolve_output_path(&mut pipeline, &video_id, output, false)?;

    Output::info("Combining processed chunks...");
    match pipeline.combine(&dest, &NullObserver) {
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

/// Work out where the combined document should go.
///
/// An explicit `--output` path wins. Otherwise the name defaults per the
/// settings (inline name, else video id) and the user is prompted unless
/// `skip_manual_name` or `assume_default` says not to; the chosen name is
/// recorded back into the settings and the file lands in `outputs/` with
/// the configured format's extension.
pub(crate) fn resolve_output_path(
    pipeline: &mut Pipeline,
    video_id: &str,
    output: Option<String>,
    assume_default: bool,
) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(PathBuf::from(path));
    }

    let combiner = pipeline.combiner();
    let default_name = combiner.default_output_name(video_id);
    let name = if assume_default || !combiner.wants_name_prompt() {
        default_name
    } else {
        prompt_for_name(&default_name)?
    };

    pipeline.record_inline_output_name(&name)?;

    let extension = pipeline.settings().output_format.extension();
    Ok(PathBuf::from("outputs").join(format!("{}.{}", name, extension)))
}

/// Ask for an output name on stdin; an empty answer keeps the default.
fn prompt_for_name(default_name: &str) -> Result<String> {
    print!("Output filename [{}]: ", default_name);
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;

    let name = line.trim();
    if name.is_empty() {
        Ok(default_name.to_string())
    } else {
        Ok(name.to_string())
    }
}
