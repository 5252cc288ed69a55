//! Archive creation: back up plain paths and materialise remote artifacts.

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::{record, Context, EntryOutcome};
use crate::config::sections::{FileEntry, RemoteArtifact};
use crate::logging::OpStatus;
use crate::resources::download::VERSION_TOKEN;
use crate::resources::{archive, download, fs as fsops};

/// Create the archive content for the named section.
///
/// An unknown section name is logged and skipped — the configured section
/// list may reference optional sections. A section without file entries is
/// trivially complete. Entries are processed in declared order; a failing
/// entry is recorded and the next entry still runs.
pub fn create_section(ctx: &Context<'_>, name: &str) {
    ctx.log.stage(&format!("Archiving section '{name}'"));

    let Some(section) = ctx.map.get(name) else {
        ctx.log
            .warn(&format!("section '{name}' is not in the section map, skipping"));
        ctx.log
            .record_op(name, OpStatus::Skipped, Some("not in section map"));
        return;
    };
    ctx.log.info(&section.desc);

    let Some(files) = section.files.as_ref() else {
        ctx.log
            .debug(&format!("section '{name}' has no files to archive"));
        return;
    };

    for entry in files {
        match entry {
            FileEntry::Plain(rel_path) => {
                let result = backup(ctx, rel_path);
                record(ctx, &format!("{name}: backup {rel_path}"), result);
            }
            FileEntry::Remote(artifact) => {
                let result = materialize(ctx, artifact);
                record(ctx, &format!("{name}: fetch {}", artifact.src), result);
            }
        }
    }
}

/// Copy `home/<rel_path>` into the archive, replacing any archive-side
/// content first. A missing source is a skip, not a failure.
fn backup(ctx: &Context<'_>, rel_path: &str) -> Result<EntryOutcome> {
    let src = ctx.identity.home.join(rel_path);
    let dst = ctx.layout.archive_dir.join(rel_path);

    ctx.log
        .info(&format!("backing up '{}' into the archive", src.display()));

    if !src.exists() {
        return Ok(EntryOutcome::Skipped(format!(
            "source '{}' does not exist",
            src.display()
        )));
    }

    fsops::replace_if_exists(&dst)?;
    fsops::make_dirs(&dir_to_prepare(&src, &dst), ctx.identity)?;
    fsops::copy_tree(&src, &dst)?;
    Ok(EntryOutcome::Done)
}

/// Resolve, fetch, and optionally extract and relocate one remote artifact.
///
/// The three steps share one entry: any failure aborts the remaining steps
/// for this artifact only.
fn materialize(ctx: &Context<'_>, artifact: &RemoteArtifact) -> Result<EntryOutcome> {
    // (a) resolve the URL template, then stream the download.
    let url = if artifact.url.contains(VERSION_TOKEN) {
        download::resolve_release_url(&artifact.url)?
    } else {
        artifact.url.clone()
    };

    let download_path = ctx.layout.download_dir.join(&artifact.src);
    ctx.log
        .info(&format!("downloading '{}' from '{url}'", artifact.src));
    download::fetch(&url, &download_path, ctx.identity)?;

    // (b) extract into the scratch directory when a member is requested.
    let mut relocate_src = download_path.clone();
    if let Some(member) = &artifact.decomp {
        ctx.log
            .info(&format!("extracting '{}' into the scratch directory", artifact.src));
        archive::extract(&download_path, &ctx.layout.extract_tmp_dir(), ctx.identity)?;
        relocate_src = ctx.layout.extract_tmp_dir().join(member);
    }

    // (c) relocate the extracted member (or the raw download) into the
    // archive tree.
    if let Some(dst_rel) = &artifact.dst {
        let dst = ctx.layout.archive_dir.join(dst_rel);
        ctx.log.info(&format!(
            "moving '{}' to '{}'",
            relocate_src.display(),
            dst.display()
        ));

        if !relocate_src.exists() {
            return Ok(EntryOutcome::Skipped(format!(
                "'{}' does not exist",
                relocate_src.display()
            )));
        }

        fsops::replace_if_exists(&dst)?;
        fsops::make_dirs(&dir_to_prepare(&relocate_src, &dst), ctx.identity)?;
        fsops::move_tree(&relocate_src, &dst)?;
    }

    Ok(EntryOutcome::Done)
}

/// Directory that must exist (identity-owned) before copying `src` to
/// `dst`: `dst` itself for directory sources, its parent otherwise.
pub(crate) fn dir_to_prepare(src: &Path, dst: &Path) -> PathBuf {
    if src.is_dir() {
        dst.to_path_buf()
    } else {
        dst.parent().map_or_else(|| dst.to_path_buf(), Path::to_path_buf)
    }
}
