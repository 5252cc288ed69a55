//! Resolution of the operating identity from the system user database.
//!
//! The archive tree always belongs to one configured, non-privileged user,
//! even though `apply` runs as root. Every component that creates paths
//! receives this [`Identity`] and chowns what it creates accordingly.

use std::path::PathBuf;

use nix::unistd::{Uid, User};

use crate::error::ConfigError;

/// The user the archive belongs to: `{username, uid, gid, home}`.
///
/// Resolved once at process start and treated as immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Login name as configured in `remake.toml`.
    pub username: String,
    /// Numeric user id.
    pub uid: u32,
    /// Numeric primary group id.
    pub gid: u32,
    /// Home directory, the base for every plain-path entry.
    pub home: PathBuf,
}

impl Identity {
    /// Resolve `username` against the system user database.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownUser`] if no such user exists, or
    /// [`ConfigError::UserLookup`] if the database cannot be queried.
    pub fn resolve(username: &str) -> Result<Self, ConfigError> {
        let user = User::from_name(username)
            .map_err(|source| ConfigError::UserLookup {
                username: username.to_string(),
                source,
            })?
            .ok_or_else(|| ConfigError::UnknownUser(username.to_string()))?;

        Ok(Self {
            username: user.name,
            uid: user.uid.as_raw(),
            gid: user.gid.as_raw(),
            home: user.dir,
        })
    }

    /// Build an identity from the process's current effective user.
    ///
    /// Used by tests and tooling that operate on trees they already own;
    /// chowning to this identity is then a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownUser`] if the effective uid has no
    /// user-database entry.
    pub fn from_effective_user() -> Result<Self, ConfigError> {
        let uid = Uid::effective();
        let user = User::from_uid(uid)
            .map_err(|source| ConfigError::UserLookup {
                username: format!("uid {}", uid.as_raw()),
                source,
            })?
            .ok_or_else(|| ConfigError::UnknownUser(format!("uid {}", uid.as_raw())))?;

        Ok(Self {
            username: user.name,
            uid: user.uid.as_raw(),
            gid: user.gid.as_raw(),
            home: user.dir,
        })
    }
}

/// The effective uid of the running process.
#[must_use]
pub fn effective_uid() -> u32 {
    Uid::effective().as_raw()
}

/// Whether the process is running as the superuser.
#[must_use]
pub fn is_root() -> bool {
    Uid::effective().is_root()
}
