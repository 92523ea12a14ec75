//! Config command implementation.

use std::path::Path;

use anyhow::Result;

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;

/// Run the config command.
pub fn run_config(action: &ConfigAction, mut settings: Settings, config_path: &Path) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }

        ConfigAction::Set { key, value } => {
            // Reject bad values before anything is written so the
            // persisted settings stay untouched on failure.
            if let Err(e) = settings.apply(key, value).and_then(|_| settings.validate()) {
                Output::error(&e.to_string());
                return Err(e.into());
            }
            settings.save_to(config_path)?;
            Output::success(&format!("Set {} = {}", key, value));
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}
