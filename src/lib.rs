//! Two-phase personal-system state archiver engine.
//!
//! `create` snapshots a set of named configuration sections — files,
//! directories, and downloaded artifacts — owned by a configured
//! non-privileged user into a local archive tree; `apply` replays that
//! archive onto a fresh system as root, restoring files and re-running
//! setup commands.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]** — parse and validate the TOML settings and section map
//! - **[`resources`]** — fallible filesystem/download/archive primitives
//! - **[`sections`]** — the section engine: per-entry dispatch, best-effort
//!   continue-on-error orchestration
//! - **[`commands`]** — top-level subcommand orchestration (`create`,
//!   `apply`, `clean`)

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod identity;
pub mod logging;
pub mod resources;
pub mod sections;
