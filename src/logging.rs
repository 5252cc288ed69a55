//! Structured logging with a per-operation summary.
//!
//! All console output goes through [`tracing`]; [`init_subscriber`] installs
//! the formatter once at process start. The [`Logger`] additionally collects
//! one [`OpEntry`] per engine operation (a backed-up file, a download, a
//! command) so the run can end with a compact status summary. Because per
//! entry failures never abort a run, the summary is the place where they
//! become visible at a glance.

use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Outcome of one engine operation, for summary reporting.
#[derive(Debug, Clone)]
pub struct OpEntry {
    /// Human-readable operation name (e.g. `"shell: backup .zshrc"`).
    pub name: String,
    /// Final status of the operation.
    pub status: OpStatus,
    /// Optional detail (skip reason or failure cause).
    pub message: Option<String>,
}

/// Status of a completed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpStatus {
    /// Operation completed successfully.
    Ok,
    /// Operation was skipped (e.g. missing source, unknown section).
    Skipped,
    /// Operation encountered an error and could not complete.
    Failed,
}

/// Abstraction over logging backends.
///
/// The section engine logs through this trait so tests can substitute a
/// recording implementation and assert on operation order and outcomes.
pub trait Log: Send + Sync {
    /// Log a stage header (major phase of a run).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (suppressed unless verbose).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Record an operation result for the summary.
    fn record_op(&self, name: &str, status: OpStatus, message: Option<&str>);
}

/// Install the global tracing subscriber.
///
/// Honors `REMAKE_LOG` for fine-grained filtering; otherwise `verbose`
/// selects between `debug` and `info` console levels.
pub fn init_subscriber(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("REMAKE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Console logger with operation-summary collection.
#[derive(Debug, Default)]
pub struct Logger {
    ops: Mutex<Vec<OpEntry>>,
}

impl Logger {
    /// Create a new logger with an empty summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a clone of all recorded operation entries.
    #[must_use]
    pub fn op_entries(&self) -> Vec<OpEntry> {
        self.ops.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Count the number of failed operations.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.ops.lock().map_or(0, |guard| {
            guard.iter().filter(|t| t.status == OpStatus::Failed).count()
        })
    }

    /// Print the summary of all recorded operations.
    pub fn print_summary(&self) {
        let ops = match self.ops.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => return,
        };
        if ops.is_empty() {
            return;
        }

        self.stage("Summary");

        let mut ok = 0u32;
        let mut skipped = 0u32;
        let mut failed = 0u32;

        for op in &ops {
            let (icon, color) = match op.status {
                OpStatus::Ok => {
                    ok += 1;
                    ("✓", "\x1b[32m")
                }
                OpStatus::Skipped => {
                    skipped += 1;
                    ("○", "\x1b[33m")
                }
                OpStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };

            let suffix = op
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", op.name));
        }

        let total = ok + skipped + failed;
        self.info(&format!(
            "{total} operations: \x1b[32m{ok} ok\x1b[0m, \x1b[33m{skipped} skipped\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        ));
    }
}

impl Log for Logger {
    fn stage(&self, msg: &str) {
        tracing::info!(target: "remake::stage", "==> {msg}");
    }

    fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    fn record_op(&self, name: &str, status: OpStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.ops.lock() {
            guard.push(OpEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }
}
