// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed home/archive/downloads tree, a
// recording logger and executor, and a section-map builder so each
// integration test can set up an isolated engine without repeating
// filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use remake_cli::config::sections::{Section, SectionMap};
use remake_cli::config::Layout;
use remake_cli::exec::{ExecStatus, Executor};
use remake_cli::identity::Identity;
use remake_cli::logging::{Log, OpStatus};
use remake_cli::sections::Context;

/// An isolated engine environment backed by a [`tempfile::TempDir`].
///
/// The layout lives under `<tmp>/work` and the operating user's home under
/// `<tmp>/home`. The identity is the current effective user (so chown calls
/// are no-ops) with its home redirected into the fixture.
pub struct EngineFixture {
    tmp: tempfile::TempDir,
    pub identity: Identity,
    pub layout: Layout,
}

impl EngineFixture {
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let home = tmp.path().join("home");
        std::fs::create_dir_all(&home).expect("create home dir");

        let mut identity = Identity::from_effective_user().expect("resolve current user");
        identity.home = home;

        let work = tmp.path().join("work");
        std::fs::create_dir_all(&work).expect("create work dir");
        let layout = Layout::new(&work);
        std::fs::create_dir_all(&layout.archive_dir).expect("create archive dir");
        std::fs::create_dir_all(&layout.download_dir).expect("create download dir");

        Self {
            tmp,
            identity,
            layout,
        }
    }

    pub fn home(&self) -> &Path {
        &self.identity.home
    }

    pub fn archive_dir(&self) -> &Path {
        &self.layout.archive_dir
    }

    pub fn download_dir(&self) -> &Path {
        &self.layout.download_dir
    }

    /// Write a file under the fixture home, creating parent directories.
    pub fn write_home(&self, rel: &str, content: &[u8]) -> PathBuf {
        write_file(&self.identity.home.join(rel), content)
    }

    /// Write a file under the fixture archive, creating parent directories.
    pub fn write_archive(&self, rel: &str, content: &[u8]) -> PathBuf {
        write_file(&self.layout.archive_dir.join(rel), content)
    }

    /// Build an engine context over this fixture.
    pub fn context<'a>(
        &'a self,
        map: &'a SectionMap,
        log: &'a dyn Log,
        executor: &'a dyn Executor,
    ) -> Context<'a> {
        Context::new(map, &self.identity, "testhost", &self.layout, log, executor)
    }
}

fn write_file(path: &Path, content: &[u8]) -> PathBuf {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dirs");
    }
    std::fs::write(path, content).expect("write file");
    path.to_path_buf()
}

/// Parse a section map from inline TOML.
pub fn section_map(toml_source: &str) -> SectionMap {
    let sections: HashMap<String, Section> =
        toml::from_str(toml_source).expect("parse section map TOML");
    SectionMap::from_sections(sections)
}

/// A [`Log`] implementation that records operations and messages for
/// assertions.
#[derive(Default)]
pub struct RecordingLog {
    ops: Mutex<Vec<(String, OpStatus)>>,
    messages: Mutex<Vec<String>>,
}

impl RecordingLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded `(name, status)` pairs, in order.
    pub fn ops(&self) -> Vec<(String, OpStatus)> {
        self.ops.lock().expect("ops lock").clone()
    }

    /// Names of recorded operations, in order.
    pub fn op_names(&self) -> Vec<String> {
        self.ops().into_iter().map(|(name, _)| name).collect()
    }

    /// Statuses of recorded operations, in order.
    pub fn op_statuses(&self) -> Vec<OpStatus> {
        self.ops().into_iter().map(|(_, status)| status).collect()
    }

    /// Every message logged at any level, in order.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("messages lock").clone()
    }

    fn push(&self, msg: &str) {
        self.messages.lock().expect("messages lock").push(msg.to_string());
    }
}

impl Log for RecordingLog {
    fn stage(&self, msg: &str) {
        self.push(msg);
    }

    fn info(&self, msg: &str) {
        self.push(msg);
    }

    fn debug(&self, msg: &str) {
        self.push(msg);
    }

    fn warn(&self, msg: &str) {
        self.push(msg);
    }

    fn error(&self, msg: &str) {
        self.push(msg);
    }

    fn record_op(&self, name: &str, status: OpStatus, _message: Option<&str>) {
        self.ops
            .lock()
            .expect("ops lock")
            .push((name.to_string(), status));
    }
}

/// An [`Executor`] that records every command and answers with a fixed
/// status instead of spawning a shell.
pub struct RecordingExecutor {
    commands: Mutex<Vec<String>>,
    success: bool,
}

impl RecordingExecutor {
    pub fn succeeding() -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            success: true,
        }
    }

    pub fn failing() -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            success: false,
        }
    }

    /// Every expanded command line this executor received, in order.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().expect("commands lock").clone()
    }
}

impl Executor for RecordingExecutor {
    fn shell(&self, command: &str) -> Result<ExecStatus, remake_cli::error::CommandError> {
        self.commands
            .lock()
            .expect("commands lock")
            .push(command.to_string());
        Ok(ExecStatus {
            success: self.success,
            code: Some(i32::from(!self.success)),
        })
    }
}
