//! Top-level subcommand orchestration.
//!
//! Each command resolves the root directory, loads and validates the
//! configuration, checks its privilege precondition, and drives the section
//! engine over the configured section list. Per-entry failures are summary
//! material only; a command fails (and the process exits nonzero) solely on
//! precondition or configuration problems.
pub mod apply;
pub mod clean;
pub mod create;

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::SETTINGS_FILE;

/// Resolve the root directory holding `remake.toml` and `sections.toml`.
///
/// Precedence: explicit `--root`, the `REMAKE_ROOT` environment variable,
/// then the current directory if it contains the settings file.
///
/// # Errors
///
/// Returns an error if no candidate contains the settings file.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    if let Some(ref root) = global.root {
        return Ok(root.clone());
    }

    if let Ok(root) = std::env::var("REMAKE_ROOT") {
        return Ok(PathBuf::from(root));
    }

    let cwd = std::env::current_dir()?;
    if cwd.join(SETTINGS_FILE).exists() {
        return Ok(cwd);
    }

    anyhow::bail!("cannot determine root directory. Use --root or set REMAKE_ROOT");
}
