//! The `apply` command: replay the archive onto the current system.

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::sections::SectionMap;
use crate::config::{Layout, Settings, SECTIONS_FILE, SETTINGS_FILE};
use crate::exec::SystemExecutor;
use crate::identity::{self, Identity};
use crate::logging::Logger;
use crate::sections::{self, Context};

/// Run the apply command.
///
/// # Errors
///
/// Returns an error for precondition failures only: unresolvable root,
/// invalid configuration, unknown user, or a non-root effective uid.
/// Per-entry restore and command failures are logged and summarised but
/// never returned.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let root = super::resolve_root(global)?;
    let settings = Settings::load(&root.join(SETTINGS_FILE))?;
    let map = SectionMap::load(&root.join(SECTIONS_FILE))?;
    let identity = Identity::resolve(&settings.username)?;

    // Restores write across an ownership boundary and replayed commands
    // configure the system, so apply is the privileged half.
    if !identity::is_root() {
        anyhow::bail!("apply must run as root");
    }

    let layout = Layout::new(&root);
    execute(&settings, &identity, &map, &layout, log);

    log.print_summary();
    Ok(())
}

/// Apply every configured section, in order. Separated from [`run`] so
/// tests can drive it without the root precondition.
pub fn execute(
    settings: &Settings,
    identity: &Identity,
    map: &SectionMap,
    layout: &Layout,
    log: &Logger,
) {
    let executor = SystemExecutor;
    let ctx = Context::new(map, identity, &settings.hostname, layout, log, &executor);
    for name in &settings.sections {
        sections::apply_section(&ctx, name);
    }
}
