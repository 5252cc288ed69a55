//! The `clean` command: delete the archive and download directories.

use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::Layout;
use crate::logging::{Log as _, Logger};

/// Run the clean command.
///
/// Removes the durable archive tree and the download staging tree. The
/// configuration files themselves are left untouched.
///
/// # Errors
///
/// Returns an error if the root cannot be resolved or a directory cannot be
/// removed.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let root = super::resolve_root(global)?;
    let layout = Layout::new(&root);

    log.stage("Cleaning archive and download directories");
    remove_tree(&layout.archive_dir, log)?;
    remove_tree(&layout.download_dir, log)?;
    Ok(())
}

fn remove_tree(path: &Path, log: &Logger) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) => {
            log.info(&format!("removing '{}'", path.display()));
            if meta.file_type().is_dir() {
                fs::remove_dir_all(path)
            } else {
                fs::remove_file(path)
            }
            .with_context(|| format!("removing {}", path.display()))
        }
        Err(_) => {
            log.debug(&format!("'{}' does not exist, nothing to clean", path.display()));
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn remove_tree_deletes_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("remake_arch");
        fs::create_dir_all(dir.join("sub")).unwrap();
        fs::write(dir.join("sub/f"), b"x").unwrap();

        remove_tree(&dir, &Logger::new()).unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn remove_tree_is_noop_for_missing_path() {
        let tmp = tempfile::tempdir().unwrap();
        remove_tree(&tmp.path().join("absent"), &Logger::new()).unwrap();
    }
}
