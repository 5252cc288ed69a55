//! Archive application: replay commands and restore archived content.

use anyhow::Result;

use super::{record, Context, EntryOutcome};
use crate::config::sections::FileEntry;
use crate::exec;
use crate::logging::OpStatus;
use crate::resources::fs as fsops;
use crate::sections::create::dir_to_prepare;

/// Apply the named section: run its commands, then restore its file
/// entries.
///
/// The lookup/skip rule matches [`create_section`](super::create_section).
/// Commands run in declared order, sequentially; a failing command is
/// recorded but does not halt the remaining commands or entries — the run
/// is best-effort throughout.
pub fn apply_section(ctx: &Context<'_>, name: &str) {
    ctx.log.stage(&format!("Applying section '{name}'"));

    let Some(section) = ctx.map.get(name) else {
        ctx.log
            .warn(&format!("section '{name}' is not in the section map, skipping"));
        ctx.log
            .record_op(name, OpStatus::Skipped, Some("not in section map"));
        return;
    };
    ctx.log.info(&section.desc);

    if let Some(cmds) = section.cmds.as_ref() {
        for template in cmds {
            let expanded = ctx.placeholders.expand(template);
            let label = format!("{name}: run '{expanded}'");
            ctx.log.info(&format!("running '{expanded}'"));

            match exec::run(ctx.executor, &ctx.placeholders, template, true) {
                Ok(()) => ctx.log.record_op(&label, OpStatus::Ok, None),
                Err(e) => {
                    ctx.log.error(&format!("{label}: {e}"));
                    ctx.log
                        .record_op(&label, OpStatus::Failed, Some(&e.to_string()));
                }
            }
        }
    }

    if let Some(files) = section.files.as_ref() {
        for entry in files {
            let rel_path = match entry {
                FileEntry::Plain(rel_path) => rel_path,
                FileEntry::Remote(artifact) => match artifact.dst.as_ref() {
                    Some(dst_rel) => dst_rel,
                    // An artifact without a destination left nothing in the
                    // archive to restore.
                    None => {
                        ctx.log.debug(&format!(
                            "no restore destination declared for '{}'",
                            artifact.src
                        ));
                        continue;
                    }
                },
            };
            let result = restore(ctx, rel_path);
            record(ctx, &format!("{name}: restore {rel_path}"), result);
        }
    }
}

/// Copy `archive/<rel_path>` back to `home/<rel_path>`, replacing whatever
/// is there, mirroring ownership from the archive-side source.
fn restore(ctx: &Context<'_>, rel_path: &str) -> Result<EntryOutcome> {
    let src = ctx.layout.archive_dir.join(rel_path);
    let dst = ctx.identity.home.join(rel_path);

    ctx.log
        .info(&format!("restoring '{}' from the archive", src.display()));

    if !src.exists() {
        return Ok(EntryOutcome::Skipped(format!(
            "'{}' is not in the archive",
            src.display()
        )));
    }

    fsops::replace_if_exists(&dst)?;
    fsops::make_dirs(&dir_to_prepare(&src, &dst), ctx.identity)?;
    fsops::copy_tree(&src, &dst)?;
    Ok(EntryOutcome::Done)
}
