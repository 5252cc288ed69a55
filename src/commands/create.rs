//! The `create` command: snapshot the configured sections into the archive.

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::sections::SectionMap;
use crate::config::{Layout, Settings, SECTIONS_FILE, SETTINGS_FILE};
use crate::exec::SystemExecutor;
use crate::identity::{self, Identity};
use crate::logging::{Log as _, Logger};
use crate::resources::fs as fsops;
use crate::sections::{self, Context};

/// Run the create command.
///
/// # Errors
///
/// Returns an error for precondition failures only: unresolvable root,
/// invalid configuration, unknown user, wrong effective uid, or a failure
/// to reset the root directories. Per-entry archiving failures are logged
/// and summarised but never returned.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let root = super::resolve_root(global)?;
    let settings = Settings::load(&root.join(SETTINGS_FILE))?;
    let map = SectionMap::load(&root.join(SECTIONS_FILE))?;
    let identity = Identity::resolve(&settings.username)?;

    // The archive must be created by its owner, not by root; apply is the
    // privileged half.
    let euid = identity::effective_uid();
    if euid != identity.uid {
        anyhow::bail!(
            "create must run as user '{}' (uid {}), but the effective uid is {euid}",
            identity.username,
            identity.uid
        );
    }

    let layout = Layout::new(&root);
    execute(&settings, &identity, &map, &layout, log)?;

    log.print_summary();
    Ok(())
}

/// Reset the root directories and archive every configured section, in
/// order. Separated from [`run`] so tests can drive it without the
/// effective-uid precondition.
///
/// # Errors
///
/// Returns an error if the archive or download root cannot be reset.
pub fn execute(
    settings: &Settings,
    identity: &Identity,
    map: &SectionMap,
    layout: &Layout,
    log: &Logger,
) -> Result<()> {
    log.stage("Resetting archive directories");
    fsops::reset_root(&layout.archive_dir, identity)?;
    fsops::reset_root(&layout.download_dir, identity)?;

    let executor = SystemExecutor;
    let ctx = Context::new(map, identity, &settings.hostname, layout, log, &executor);
    for name in &settings.sections {
        sections::create_section(&ctx, name);
    }
    Ok(())
}
