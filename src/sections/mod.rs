//! The section engine: interprets one named section's declarative entry
//! list and dispatches it to filesystem, download, and command primitives.
//!
//! Control flow is strictly sequential and best-effort: sections run in the
//! order the settings list them, entries in declared order within a section,
//! and every failure is caught at the entry (or command) level, logged,
//! recorded for the summary, and the run continues. Nothing in this module
//! aborts a section, let alone a run.

pub mod apply;
pub mod create;

pub use apply::apply_section;
pub use create::create_section;

use crate::config::sections::SectionMap;
use crate::config::Layout;
use crate::exec::{Executor, Placeholders};
use crate::identity::Identity;
use crate::logging::{Log, OpStatus};

/// Everything a section run needs, borrowed from the calling command.
pub struct Context<'a> {
    /// The validated section map; lookups only.
    pub map: &'a SectionMap,
    /// The user the archive belongs to.
    pub identity: &'a Identity,
    /// Archive and download directory layout.
    pub layout: &'a Layout,
    /// Substitution table for command templates.
    pub placeholders: Placeholders,
    /// Outcome sink; a recording logger in tests.
    pub log: &'a dyn Log,
    /// Shell executor; a mock in tests.
    pub executor: &'a dyn Executor,
}

impl<'a> Context<'a> {
    /// Assemble a context, deriving the placeholder table from the resolved
    /// identity, hostname, and layout.
    #[must_use]
    pub fn new(
        map: &'a SectionMap,
        identity: &'a Identity,
        hostname: &str,
        layout: &'a Layout,
        log: &'a dyn Log,
        executor: &'a dyn Executor,
    ) -> Self {
        let placeholders = Placeholders::new(identity, hostname, layout);
        Self {
            map,
            identity,
            layout,
            placeholders,
            log,
            executor,
        }
    }
}

/// Outcome of one entry-level operation that did not error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// The entry was fully processed.
    Done,
    /// The entry was intentionally skipped, with a reason.
    Skipped(String),
}

/// Log and record one entry-level result, converting errors into summary
/// lines instead of propagating them.
pub(crate) fn record(ctx: &Context<'_>, name: &str, result: anyhow::Result<EntryOutcome>) {
    match result {
        Ok(EntryOutcome::Done) => ctx.log.record_op(name, OpStatus::Ok, None),
        Ok(EntryOutcome::Skipped(reason)) => {
            ctx.log.warn(&format!("{name}: skipped ({reason})"));
            ctx.log.record_op(name, OpStatus::Skipped, Some(&reason));
        }
        Err(e) => {
            ctx.log.error(&format!("{name}: {e:#}"));
            ctx.log.record_op(name, OpStatus::Failed, Some(&format!("{e:#}")));
        }
    }
}
