//! TOML configuration loading: run settings and the section map.
//!
//! Two files drive a run, both living in the tool's root directory:
//!
//! - `remake.toml` — [`Settings`]: the operating `username`, the target
//!   `hostname`, and the ordered `sections` list that fixes processing order.
//! - `sections.toml` — the [`SectionMap`](sections::SectionMap): one table per
//!   named section describing what to archive and which commands to replay.
//!
//! Loading is strict: unknown keys are rejected everywhere, and structural
//! invariants (every section declares `cmds` or `files`) are checked here so
//! the engine can trust the map unconditionally.

pub mod sections;

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Name of the settings file expected in the root directory.
pub const SETTINGS_FILE: &str = "remake.toml";
/// Name of the section-map file expected in the root directory.
pub const SECTIONS_FILE: &str = "sections.toml";

/// Run settings from `remake.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// The non-privileged user the archive belongs to.
    pub username: String,
    /// Hostname substituted into command templates.
    pub hostname: String,
    /// Section names to process, in order. May reference sections absent
    /// from the map; those are skipped at run time.
    pub sections: Vec<String>,
}

impl Settings {
    /// Load settings from the given file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file is missing, unreadable, or not
    /// valid TOML for this shape.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = read_config_file(path)?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// The on-disk layout the engine works against.
///
/// Both top-level directories sit beside the configuration files. The
/// archive directory is the durable output of `create` and the input of
/// `apply`; the download directory is scratch staging, including a `tmp`
/// subdirectory used transiently during extraction.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Directory holding `remake.toml` and `sections.toml`.
    pub root: PathBuf,
    /// Durable archive tree (`remake_arch/`).
    pub archive_dir: PathBuf,
    /// Download staging tree (`downloads/`).
    pub download_dir: PathBuf,
}

impl Layout {
    /// Derive the layout from a root directory.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            archive_dir: root.join("remake_arch"),
            download_dir: root.join("downloads"),
        }
    }

    /// The transient extraction scratch directory (`downloads/tmp`).
    #[must_use]
    pub fn extract_tmp_dir(&self) -> PathBuf {
        self.download_dir.join("tmp")
    }
}

/// Read a config file to a string, mapping absence and I/O failures to
/// [`ConfigError`] variants.
pub(crate) fn read_config_file(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn write_settings(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(SETTINGS_FILE);
        std::fs::write(&path, content).expect("write settings file");
        path
    }

    #[test]
    fn load_valid_settings() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_settings(
            tmp.path(),
            "username = \"alice\"\nhostname = \"workstation\"\nsections = [\"shell\", \"editor\"]\n",
        );

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.username, "alice");
        assert_eq!(settings.hostname, "workstation");
        assert_eq!(settings.sections, vec!["shell", "editor"]);
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = Settings::load(&tmp.path().join(SETTINGS_FILE)).unwrap_err();
        assert!(
            matches!(err, ConfigError::NotFound { .. }),
            "expected NotFound, got {err}"
        );
    }

    #[test]
    fn load_rejects_missing_username() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_settings(tmp.path(), "hostname = \"h\"\nsections = []\n");
        let err = Settings::load(&path).unwrap_err();
        assert!(
            matches!(err, ConfigError::Parse { .. }),
            "expected Parse, got {err}"
        );
    }

    #[test]
    fn load_rejects_unknown_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_settings(
            tmp.path(),
            "username = \"a\"\nhostname = \"h\"\nsections = []\nextra = 1\n",
        );
        let err = Settings::load(&path).unwrap_err();
        assert!(
            matches!(err, ConfigError::Parse { .. }),
            "expected Parse for extra key, got {err}"
        );
    }

    #[test]
    fn layout_paths_derive_from_root() {
        let layout = Layout::new(Path::new("/srv/remake"));
        assert_eq!(layout.archive_dir, Path::new("/srv/remake/remake_arch"));
        assert_eq!(layout.download_dir, Path::new("/srv/remake/downloads"));
        assert_eq!(
            layout.extract_tmp_dir(),
            Path::new("/srv/remake/downloads/tmp")
        );
    }
}
