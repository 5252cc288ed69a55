//! Recursive filesystem primitives with ownership semantics.
//!
//! Two ownership rules coexist: paths created *directly* under the archive
//! or download roots (directories, downloads, extracted trees) belong to the
//! configured [`Identity`]; paths produced by *copying* existing content
//! mirror the owner of the corresponding source path, so sections can back
//! up and restore files across an ownership boundary.
//!
//! Every operation returns a typed [`FsError`] carrying the offending path;
//! callers catch at the entry level and continue with the next entry.

use std::fs;
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use nix::unistd::{Gid, Uid};

use crate::error::FsError;
use crate::identity::Identity;

/// Create every missing ancestor directory from the root down to `path`,
/// chowning each newly created directory to `identity`.
///
/// Idempotent — existing directories are left untouched.
///
/// # Errors
///
/// Returns [`FsError::CreateDir`] or [`FsError::Chown`] for the first
/// directory that cannot be created or chowned.
pub fn make_dirs(path: &Path, identity: &Identity) -> Result<(), FsError> {
    let mut ancestors: Vec<&Path> = path.ancestors().collect();
    ancestors.reverse();

    for dir in ancestors {
        if dir.as_os_str().is_empty() || dir.exists() {
            continue;
        }
        fs::create_dir(dir).map_err(|source| FsError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
        chown_to(dir, identity.uid, identity.gid)?;
    }
    Ok(())
}

/// Recursively copy `src` (file or directory) to `dst`, then set the owner
/// of every copied path to match the corresponding source path's on-disk
/// owner.
///
/// Existing destination files are overwritten; directory structure outside
/// `dst` is never altered. Permissions and modification times are carried
/// over from the source. Symlinks in the source tree are followed and their
/// contents materialised.
///
/// # Errors
///
/// Returns [`FsError`] if any file or directory cannot be read, written, or
/// chowned.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<(), FsError> {
    if src.is_dir() {
        copy_dir_recursive(src, dst)?;
    } else {
        copy_file(src, dst)?;
    }
    mirror_ownership(src, dst)
}

/// Equivalent to [`copy_tree`] followed by recursive deletion of `src`.
///
/// Used when relocating downloaded or extracted content — the staging copy
/// is disposable once it has landed in the archive.
///
/// # Errors
///
/// Returns [`FsError`] if the copy fails or the source cannot be removed.
pub fn move_tree(src: &Path, dst: &Path) -> Result<(), FsError> {
    copy_tree(src, dst)?;
    remove_any(src)
}

/// If `dst` exists, delete it (directory: recursive; file: single unlink).
///
/// A destination that is neither a plain file nor a directory (symlink,
/// device, …) is refused with [`FsError::InvalidDestinationType`]; the
/// caller aborts that entry and the run continues.
///
/// # Errors
///
/// Returns [`FsError`] if the existing destination is of an invalid type or
/// cannot be removed.
pub fn replace_if_exists(dst: &Path) -> Result<(), FsError> {
    let meta = match fs::symlink_metadata(dst) {
        Ok(meta) => meta,
        Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(source) => {
            return Err(FsError::Metadata {
                path: dst.to_path_buf(),
                source,
            })
        }
    };

    let file_type = meta.file_type();
    if file_type.is_dir() {
        fs::remove_dir_all(dst).map_err(|source| FsError::Remove {
            path: dst.to_path_buf(),
            source,
        })
    } else if file_type.is_file() {
        fs::remove_file(dst).map_err(|source| FsError::Remove {
            path: dst.to_path_buf(),
            source,
        })
    } else {
        Err(FsError::InvalidDestinationType {
            path: dst.to_path_buf(),
        })
    }
}

/// Recursively chown `path` (file or directory tree) to `identity`.
///
/// Applied to everything materialised directly from the network or an
/// archive, where no meaningful source owner exists.
///
/// # Errors
///
/// Returns [`FsError`] if any path cannot be inspected or chowned.
pub fn chown_tree(path: &Path, identity: &Identity) -> Result<(), FsError> {
    chown_to(path, identity.uid, identity.gid)?;
    if path.is_dir() {
        for entry in read_dir_entries(path)? {
            chown_tree(&entry, identity)?;
        }
    }
    Ok(())
}

/// Delete `dir` if it exists (whatever its type) and recreate it empty,
/// owned by `identity`.
///
/// This is the start-of-`create` lifecycle for the archive and download
/// roots: stale partial state never survives into a new run.
///
/// # Errors
///
/// Returns [`FsError`] if the old directory cannot be removed or the new one
/// cannot be created.
pub fn reset_root(dir: &Path, identity: &Identity) -> Result<(), FsError> {
    if fs::symlink_metadata(dir).is_ok() {
        remove_any(dir)?;
    }
    make_dirs(dir, identity)
}

/// Remove a path of any type: directories recursively, everything else with
/// a single unlink.
fn remove_any(path: &Path) -> Result<(), FsError> {
    let meta = fs::symlink_metadata(path).map_err(|source| FsError::Metadata {
        path: path.to_path_buf(),
        source,
    })?;
    let result = if meta.file_type().is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|source| FsError::Remove {
        path: path.to_path_buf(),
        source,
    })
}

/// Recursively copy directory contents, creating `dst` if needed.
fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<(), FsError> {
    fs::create_dir_all(dst).map_err(|source| FsError::CreateDir {
        path: dst.to_path_buf(),
        source,
    })?;
    for src_path in read_dir_entries(src)? {
        let Some(name) = src_path.file_name() else {
            continue;
        };
        let dst_path = dst.join(name);
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            copy_file(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Copy a single file, carrying over its modification time.
fn copy_file(src: &Path, dst: &Path) -> Result<(), FsError> {
    fs::copy(src, dst).map_err(|source| FsError::Copy {
        src: src.to_path_buf(),
        dst: dst.to_path_buf(),
        source,
    })?;

    // Timestamp preservation is best-effort, like permission bits: a source
    // we can read but not stat precisely should not fail the copy.
    if let Ok(modified) = fs::metadata(src).and_then(|m| m.modified()) {
        if let Ok(file) = fs::OpenOptions::new().write(true).open(dst) {
            let _ = file.set_modified(modified);
        }
    }
    Ok(())
}

/// Set the owner of every path under `dst` to the owner of the
/// corresponding path under `src`.
fn mirror_ownership(src: &Path, dst: &Path) -> Result<(), FsError> {
    let meta = fs::metadata(src).map_err(|source| FsError::Metadata {
        path: src.to_path_buf(),
        source,
    })?;
    chown_to(dst, meta.uid(), meta.gid())?;

    if meta.is_dir() {
        for src_path in read_dir_entries(src)? {
            let Some(name) = src_path.file_name() else {
                continue;
            };
            let dst_path = dst.join(name);
            if dst_path.exists() {
                mirror_ownership(&src_path, &dst_path)?;
            }
        }
    }
    Ok(())
}

fn chown_to(path: &Path, uid: u32, gid: u32) -> Result<(), FsError> {
    nix::unistd::chown(path, Some(Uid::from_raw(uid)), Some(Gid::from_raw(gid))).map_err(
        |source| FsError::Chown {
            path: path.to_path_buf(),
            source,
        },
    )
}

fn read_dir_entries(dir: &Path) -> Result<Vec<std::path::PathBuf>, FsError> {
    let mut entries = Vec::new();
    let iter = fs::read_dir(dir).map_err(|source| FsError::Metadata {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in iter {
        let entry = entry.map_err(|source| FsError::Metadata {
            path: dir.to_path_buf(),
            source,
        })?;
        entries.push(entry.path());
    }
    Ok(entries)
}
