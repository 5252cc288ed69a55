//! Domain-specific error types for the archiver engine.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Resource primitives return typed errors (e.g., [`FsError`],
//! [`DownloadError`]) while the section engine and command handlers at the
//! CLI boundary convert them to [`anyhow::Error`] via the standard `?`
//! operator.
//!
//! # Error hierarchy
//!
//! ```text
//! RemakeError
//! ├── Config(ConfigError)     — settings and section-map loading
//! ├── Fs(FsError)             — copy/move/remove/chown primitives
//! ├── Download(DownloadError) — release lookup and artifact fetch
//! ├── Archive(ArchiveError)   — archive detection and extraction
//! └── Command(CommandError)   — shell command execution
//! ```
//!
//! Every failure is caught at the smallest enclosing unit of work (one file
//! entry, one command, one download) and logged; nothing in this hierarchy
//! aborts a whole section or a whole run.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the archiver engine.
///
/// Aggregates domain-specific sub-errors and is convertible to
/// [`anyhow::Error`] for use at command boundaries.
#[derive(Error, Debug)]
pub enum RemakeError {
    /// Configuration-related error (loading, parsing, validation).
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Filesystem primitive error (copy, move, remove, chown).
    #[error("filesystem error: {0}")]
    Fs(#[from] FsError),

    /// Download error (release lookup or artifact fetch).
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// Archive extraction error.
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Shell command execution error.
    #[error("command error: {0}")]
    Command(#[from] CommandError),
}

/// Errors that arise from loading `remake.toml` or the section map.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required configuration file does not exist.
    #[error("config file not found: {}", .path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The file exists but is not valid TOML for the expected shape.
    #[error("invalid TOML in {}: {source}", .path.display())]
    Parse {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying deserialization error.
        source: toml::de::Error,
    },

    /// An I/O error occurred while reading a config file.
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A section violates a structural invariant the loader enforces.
    #[error("section '{section}': {reason}")]
    InvalidSection {
        /// Name of the offending section.
        section: String,
        /// Human-readable violation.
        reason: String,
    },

    /// The configured username does not exist in the user database.
    #[error("unknown user '{0}'")]
    UnknownUser(String),

    /// The user database could not be queried.
    #[error("failed to query user database for '{username}': {source}")]
    UserLookup {
        /// Username that was being resolved.
        username: String,
        /// Underlying system error.
        source: nix::Error,
    },
}

/// Errors raised by the filesystem primitives in [`crate::resources::fs`].
///
/// Each variant carries the offending path so callers can report a precise
/// status line before moving on to the next entry.
#[derive(Error, Debug)]
pub enum FsError {
    /// The destination exists but is neither a plain file nor a directory
    /// (e.g. a symlink or device node); the entry is refused rather than
    /// replaced.
    #[error("destination {} is not a regular file or directory", .path.display())]
    InvalidDestinationType {
        /// The refused destination.
        path: PathBuf,
    },

    /// A directory could not be created.
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A file or directory tree could not be copied.
    #[error("failed to copy {} to {}: {source}", .src.display(), .dst.display())]
    Copy {
        /// Copy source.
        src: PathBuf,
        /// Copy destination.
        dst: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A file or directory tree could not be removed.
    #[error("failed to remove {}: {source}", .path.display())]
    Remove {
        /// Path that could not be removed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Ownership of a path could not be changed.
    #[error("failed to change ownership of {}: {source}", .path.display())]
    Chown {
        /// Path whose owner could not be set.
        path: PathBuf,
        /// Underlying system error.
        source: nix::Error,
    },

    /// Metadata for a path could not be read.
    #[error("failed to stat {}: {source}", .path.display())]
    Metadata {
        /// Path that could not be inspected.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors raised while resolving or fetching a remote artifact.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// The templated URL does not match the expected release-download shape.
    #[error("URL '{url}' does not match the release download template")]
    TemplateFormat {
        /// The offending URL.
        url: String,
    },

    /// A transport-level failure talking to the remote host.
    #[error("network error: {source}")]
    Network {
        /// Underlying HTTP client error.
        source: Box<ureq::Error>,
    },

    /// The remote host answered with a non-success status code.
    #[error("unexpected HTTP status {code}")]
    UnexpectedStatus {
        /// The HTTP status code received.
        code: u16,
    },

    /// The release metadata payload could not be parsed as JSON.
    #[error("release metadata is not valid JSON: {source}")]
    Metadata {
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The release metadata parsed but carries no tag name.
    #[error("release metadata has no tag name")]
    MissingTag,

    /// The response body could not be written to the destination file.
    #[error("failed to write download to {}: {source}", .path.display())]
    Io {
        /// Destination the body was being streamed to.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors raised while classifying or extracting a downloaded archive.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The file matches neither the zip nor a supported tar-family format.
    #[error("{} is not a supported archive format", .path.display())]
    Unsupported {
        /// The unclassifiable file.
        path: PathBuf,
    },

    /// The archive file could not be opened or the scratch dir prepared.
    #[error("failed to read archive {}: {source}", .path.display())]
    Io {
        /// The archive being processed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A zip archive failed to extract.
    #[error("failed to extract zip archive {}: {source}", .path.display())]
    Zip {
        /// The archive being extracted.
        path: PathBuf,
        /// Underlying zip error.
        source: zip::result::ZipError,
    },

    /// A tar-family archive failed to extract.
    #[error("failed to extract tar archive {}: {source}", .path.display())]
    Tar {
        /// The archive being extracted.
        path: PathBuf,
        /// Underlying I/O error from the tar reader.
        source: std::io::Error,
    },
}

/// Errors raised while executing a configured shell command.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The command interpreter could not be spawned at all.
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        /// The expanded command line.
        command: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The command ran but exited with a non-zero status.
    #[error("command '{command}' failed (exit {})", .code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    Failed {
        /// The expanded command line.
        command: String,
        /// Exit code, if the process exited normally.
        code: Option<i32>,
    },
}
