//! Archive format detection and extraction into a scratch directory.
//!
//! Formats are classified by magic bytes, never by file extension: zip, or
//! a tar stream behind one of the common compression codecs (raw, gzip, xz,
//! zstd). Anything else is reported as unsupported and the caller skips
//! extraction for that entry.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{ArchiveError, RemakeError};
use crate::identity::Identity;
use crate::resources::fs as fsops;

/// Classified archive container format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// A zip archive.
    Zip,
    /// A tar stream behind the given compression codec.
    Tar(TarCodec),
}

/// Compression codec wrapping a tar stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TarCodec {
    /// Uncompressed tar.
    None,
    /// gzip (`.tar.gz`).
    Gzip,
    /// xz (`.tar.xz`).
    Xz,
    /// zstandard (`.tar.zst`).
    Zstd,
}

impl TarCodec {
    /// Wrap `reader` in the matching decompressor.
    fn decoder<R: Read>(self, reader: R) -> std::io::Result<Decoder<R>> {
        match self {
            Self::None => Ok(Decoder::Plain(reader)),
            Self::Gzip => Ok(Decoder::Gzip(Box::new(flate2::read::GzDecoder::new(
                reader,
            )))),
            Self::Xz => Ok(Decoder::Xz(Box::new(xz2::read::XzDecoder::new(reader)))),
            Self::Zstd => Ok(Decoder::Zstd(Box::new(zstd::stream::read::Decoder::new(
                reader,
            )?))),
        }
    }
}

/// Decoder wrapper so all tar codecs share one extraction path.
enum Decoder<R: Read> {
    Plain(R),
    Gzip(Box<flate2::read::GzDecoder<R>>),
    Xz(Box<xz2::read::XzDecoder<R>>),
    Zstd(Box<zstd::stream::read::Decoder<'static, BufReader<R>>>),
}

impl<R: Read> Read for Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Self::Plain(r) => r.read(buf),
            Self::Gzip(d) => d.read(buf),
            Self::Xz(d) => d.read(buf),
            Self::Zstd(d) => d.read(buf),
        }
    }
}

/// Classify a byte prefix. A plain tar needs the full 512-byte header to
/// expose its `ustar` marker, so callers should hand in at least that much.
#[must_use]
pub fn detect_format(data: &[u8]) -> Option<ArchiveFormat> {
    match data {
        [0x50, 0x4B, 0x03, 0x04, ..] => Some(ArchiveFormat::Zip),
        [0x1F, 0x8B, ..] => Some(ArchiveFormat::Tar(TarCodec::Gzip)),
        [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00, ..] => Some(ArchiveFormat::Tar(TarCodec::Xz)),
        [0x28, 0xB5, 0x2F, 0xFD, ..] => Some(ArchiveFormat::Tar(TarCodec::Zstd)),
        _ => {
            if data.len() >= 512 && data.get(257..263) == Some(b"ustar\0".as_slice()) {
                Some(ArchiveFormat::Tar(TarCodec::None))
            } else {
                None
            }
        }
    }
}

/// Classify the archive at `path` by its magic bytes.
///
/// # Errors
///
/// Returns [`ArchiveError::Io`] if the file cannot be read, or
/// [`ArchiveError::Unsupported`] if it matches no known format.
pub fn detect_file_format(path: &Path) -> Result<ArchiveFormat, ArchiveError> {
    let mut file = File::open(path).map_err(|source| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut header = [0u8; 512];
    let mut filled = 0;
    // A short file is fine; classify on whatever prefix exists.
    while filled < header.len() {
        let read = file
            .read(&mut header[filled..])
            .map_err(|source| ArchiveError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        if read == 0 {
            break;
        }
        filled += read;
    }

    detect_format(header.get(..filled).unwrap_or(&[])).ok_or_else(|| ArchiveError::Unsupported {
        path: path.to_path_buf(),
    })
}

/// Extract all members of the archive at `archive_path` into `scratch_dir`.
///
/// The scratch directory is cleared first (deleted whatever it currently
/// is), the archive type is detected from magic bytes, and the resulting
/// tree is chowned to `identity`.
///
/// # Errors
///
/// Returns a [`RemakeError`] wrapping [`ArchiveError`] for detection or
/// extraction failures, or an [`FsError`](crate::error::FsError) for
/// scratch-dir or chown failures.
pub fn extract(
    archive_path: &Path,
    scratch_dir: &Path,
    identity: &Identity,
) -> Result<(), RemakeError> {
    fsops::replace_if_exists(scratch_dir)?;
    let format = detect_file_format(archive_path)?;
    fsops::make_dirs(scratch_dir, identity)?;

    let file = File::open(archive_path).map_err(|source| ArchiveError::Io {
        path: archive_path.to_path_buf(),
        source,
    })?;

    match format {
        ArchiveFormat::Zip => {
            let mut archive = zip::ZipArchive::new(file).map_err(|source| ArchiveError::Zip {
                path: archive_path.to_path_buf(),
                source,
            })?;
            archive
                .extract(scratch_dir)
                .map_err(|source| ArchiveError::Zip {
                    path: archive_path.to_path_buf(),
                    source,
                })?;
        }
        ArchiveFormat::Tar(codec) => {
            let decoder = codec.decoder(file).map_err(|source| ArchiveError::Io {
                path: archive_path.to_path_buf(),
                source,
            })?;
            tar::Archive::new(decoder)
                .unpack(scratch_dir)
                .map_err(|source| ArchiveError::Tar {
                    path: archive_path.to_path_buf(),
                    source,
                })?;
        }
    }

    fsops::chown_tree(scratch_dir, identity)?;
    Ok(())
}
