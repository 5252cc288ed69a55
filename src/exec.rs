//! Shell command execution with placeholder expansion.
//!
//! Configured commands are templates over a fixed set of placeholders
//! (`{username}`, `{hostname}`, `{uid}`, `{gid}`, `{home}`, `{down_dir}`,
//! `{remake_arch_dir}`). [`Placeholders`] expands them textually; anything
//! not in the table is left verbatim. Execution goes through the
//! [`Executor`] trait so the section engine can be driven against a mock in
//! tests, with [`SystemExecutor`] as the production implementation: commands
//! run synchronously under `/bin/bash -c` with inherited standard streams.

use std::process::Command;

use crate::config::Layout;
use crate::error::CommandError;
use crate::identity::Identity;

/// Resolved values substituted into command templates.
#[derive(Debug, Clone)]
pub struct Placeholders {
    pairs: Vec<(&'static str, String)>,
}

impl Placeholders {
    /// Build the substitution table from the resolved process-wide values.
    #[must_use]
    pub fn new(identity: &Identity, hostname: &str, layout: &Layout) -> Self {
        Self {
            pairs: vec![
                ("{username}", identity.username.clone()),
                ("{hostname}", hostname.to_string()),
                ("{uid}", identity.uid.to_string()),
                ("{gid}", identity.gid.to_string()),
                ("{home}", identity.home.display().to_string()),
                ("{down_dir}", layout.download_dir.display().to_string()),
                ("{remake_arch_dir}", layout.archive_dir.display().to_string()),
            ],
        }
    }

    /// Expand every known placeholder in `template`.
    ///
    /// Unmatched placeholders are left verbatim; the template is also
    /// trimmed of surrounding whitespace.
    #[must_use]
    pub fn expand(&self, template: &str) -> String {
        let mut expanded = template.trim().to_string();
        for (token, value) in &self.pairs {
            expanded = expanded.replace(token, value);
        }
        expanded
    }
}

/// Result of a command execution that at least started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecStatus {
    /// Whether the command exited with status zero.
    pub success: bool,
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
}

/// Abstraction over shell command execution.
pub trait Executor: Send + Sync {
    /// Run `command` through the shell, synchronously, inheriting the
    /// process's standard streams.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Spawn`] only if the interpreter itself could
    /// not be started; a command that runs and fails is reported through
    /// [`ExecStatus`].
    fn shell(&self, command: &str) -> Result<ExecStatus, CommandError>;
}

/// Production [`Executor`] backed by `/bin/bash`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn shell(&self, command: &str) -> Result<ExecStatus, CommandError> {
        let status = Command::new("/bin/bash")
            .arg("-c")
            .arg(command)
            .status()
            .map_err(|source| CommandError::Spawn {
                command: command.to_string(),
                source,
            })?;

        Ok(ExecStatus {
            success: status.success(),
            code: status.code(),
        })
    }
}

/// Expand and execute one command template.
///
/// With `fail_fast`, a non-zero exit is surfaced as
/// [`CommandError::Failed`]; callers report it and continue with the next
/// command — it never propagates past one command.
///
/// # Errors
///
/// Returns [`CommandError`] if the interpreter cannot be spawned or (with
/// `fail_fast`) if the command exits non-zero.
pub fn run(
    executor: &dyn Executor,
    placeholders: &Placeholders,
    template: &str,
    fail_fast: bool,
) -> Result<(), CommandError> {
    let command = placeholders.expand(template);
    let status = executor.shell(&command)?;

    if fail_fast && !status.success {
        return Err(CommandError::Failed {
            command,
            code: status.code,
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    fn test_identity() -> Identity {
        Identity {
            username: "alice".to_string(),
            uid: 1000,
            gid: 1000,
            home: PathBuf::from("/home/alice"),
        }
    }

    fn test_placeholders() -> Placeholders {
        Placeholders::new(
            &test_identity(),
            "workstation",
            &Layout::new(Path::new("/srv/remake")),
        )
    }

    /// Records every command it is asked to run and answers with a fixed
    /// status.
    struct RecordingExecutor {
        commands: Mutex<Vec<String>>,
        success: bool,
    }

    impl RecordingExecutor {
        fn new(success: bool) -> Self {
            Self {
                commands: Mutex::new(Vec::new()),
                success,
            }
        }

        fn commands(&self) -> Vec<String> {
            self.commands.lock().unwrap().clone()
        }
    }

    impl Executor for RecordingExecutor {
        fn shell(&self, command: &str) -> Result<ExecStatus, CommandError> {
            self.commands.lock().unwrap().push(command.to_string());
            Ok(ExecStatus {
                success: self.success,
                code: Some(i32::from(!self.success)),
            })
        }
    }

    #[test]
    fn expand_substitutes_all_placeholders() {
        let expanded = test_placeholders().expand(
            "echo {username}@{hostname} {uid}:{gid} {home} {down_dir} {remake_arch_dir}",
        );
        assert_eq!(
            expanded,
            "echo alice@workstation 1000:1000 /home/alice /srv/remake/downloads /srv/remake/remake_arch"
        );
    }

    #[test]
    fn expand_leaves_unknown_placeholders_verbatim() {
        let expanded = test_placeholders().expand("echo {unknown} {username}");
        assert_eq!(expanded, "echo {unknown} alice");
    }

    #[test]
    fn expand_trims_surrounding_whitespace() {
        let expanded = test_placeholders().expand("  echo hi  ");
        assert_eq!(expanded, "echo hi");
    }

    #[test]
    fn run_passes_expanded_command_to_executor() {
        let executor = RecordingExecutor::new(true);
        run(&executor, &test_placeholders(), "echo {username}", true).unwrap();
        assert_eq!(executor.commands(), vec!["echo alice".to_string()]);
    }

    #[test]
    fn run_fail_fast_surfaces_nonzero_exit() {
        let executor = RecordingExecutor::new(false);
        let err = run(&executor, &test_placeholders(), "false", true).unwrap_err();
        assert!(
            matches!(err, CommandError::Failed { code: Some(1), .. }),
            "expected Failed with exit 1, got {err}"
        );
    }

    #[test]
    fn run_without_fail_fast_ignores_nonzero_exit() {
        let executor = RecordingExecutor::new(false);
        run(&executor, &test_placeholders(), "false", false).unwrap();
    }

    #[test]
    fn system_executor_runs_true() {
        let status = SystemExecutor.shell("true").unwrap();
        assert!(status.success);
        assert_eq!(status.code, Some(0));
    }

    #[test]
    fn system_executor_reports_failure_status() {
        let status = SystemExecutor.shell("exit 3").unwrap();
        assert!(!status.success);
        assert_eq!(status.code, Some(3));
    }
}
