//! Clean command implementation.

use anyhow::Result;

use crate::cli::Output;
use crate::workspace::Workspace;

/// Clear the temp workspace.
pub fn run_clean() -> Result<()> {
    let workspace = Workspace::new(Workspace::default_root());
    workspace.init()?;
    workspace.reset()?;
    Output::success("Temp workspace cleared.");
    Ok(())
}
