//! Section-map loading and validation.
use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Map from section name to [`Section`], as loaded from `sections.toml`.
///
/// Lookups only — processing order always comes from the `sections` list in
/// `remake.toml`, so no ordered map is needed here.
#[derive(Debug, Clone, Default)]
pub struct SectionMap {
    sections: HashMap<String, Section>,
}

/// One named configuration section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Section {
    /// Human-readable description, printed when the section is processed.
    pub desc: String,
    /// Shell-command templates to replay on `apply`, in declared order.
    #[serde(default)]
    pub cmds: Option<Vec<String>>,
    /// File entries to archive on `create` and restore on `apply`, in
    /// declared order.
    #[serde(default)]
    pub files: Option<Vec<FileEntry>>,
}

/// A single entry in a section's `files` list — either a plain home-relative
/// path or a structured remote artifact.
///
/// The polymorphism is decided once here at load time; the engine dispatches
/// on the variant and never re-inspects shapes.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FileEntry {
    /// Plain string: `".zshrc"` — copied verbatim relative to `$HOME`.
    Plain(String),
    /// Structured: `{ url = "…", src = "tool.zip", decomp = "tool/bin",
    /// dst = "tool-bin" }` — downloaded, optionally extracted and relocated.
    Remote(RemoteArtifact),
}

/// A downloaded file, optionally an archive member to extract and relocate.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RemoteArtifact {
    /// Download URL; may contain a `{version}` placeholder resolved against
    /// the hosting site's latest-release metadata.
    pub url: String,
    /// File name the download is stored under in the download directory.
    pub src: String,
    /// Archive member to extract from the download, relative to the archive
    /// root inside the file.
    #[serde(default)]
    pub decomp: Option<String>,
    /// Destination path under the archive root the download (or extracted
    /// member) is moved to; also the home-relative restore location.
    #[serde(default)]
    pub dst: Option<String>,
}

impl SectionMap {
    /// Load and validate the section map from the given file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file is missing, unreadable, not
    /// valid TOML for this shape (including any unknown key), or if any
    /// section declares neither `cmds` nor `files`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = super::read_config_file(path)?;
        let sections: HashMap<String, Section> =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let map = Self { sections };
        map.validate()?;
        Ok(map)
    }

    /// Build a map directly from parsed sections (used by tests).
    #[must_use]
    pub fn from_sections(sections: HashMap<String, Section>) -> Self {
        Self { sections }
    }

    /// Look up a section by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// Whether a section with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// Number of sections in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, section) in &self.sections {
            if section.cmds.is_none() && section.files.is_none() {
                return Err(ConfigError::InvalidSection {
                    section: name.clone(),
                    reason: "must declare 'cmds' or 'files'".to_string(),
                });
            }
        }
        Ok(())
    }
}
