//! Remote artifact resolution and streaming download.
//!
//! URLs may carry a `{version}` placeholder; such URLs are treated as
//! templates against the GitHub release API — the latest release tag of the
//! `owner/repo` named in the URL is fetched and substituted. Downloads are
//! streamed to disk in fixed-size chunks with progress reported against the
//! declared content length when one is present.

use std::io::{Read, Write};
use std::path::Path;

use crate::error::{DownloadError, RemakeError};
use crate::identity::Identity;
use crate::resources::fs as fsops;

/// Placeholder token substituted with the resolved release version.
pub const VERSION_TOKEN: &str = "{version}";

/// Streaming chunk size for downloads.
const CHUNK_SIZE: usize = 8192;

const USER_AGENT: &str = concat!("remake/", env!("CARGO_PKG_VERSION"));

/// Resolve a templated release-download URL to a concrete one.
///
/// The URL must match
/// `https://github.com/{owner}/{repo}/releases/download/…`; the latest
/// release of that repository is looked up and its tag substituted for
/// [`VERSION_TOKEN`]. Only a single leading `v` is stripped from the tag —
/// a deliberate format assumption for `v`-prefixed tags; repositories with
/// other tag conventions will produce a wrong version string.
///
/// # Errors
///
/// - [`DownloadError::TemplateFormat`] if the URL does not match the shape
/// - [`DownloadError::Network`] on transport failure
/// - [`DownloadError::UnexpectedStatus`] if the API answers non-success
/// - [`DownloadError::Metadata`] / [`DownloadError::MissingTag`] if the
///   response cannot be parsed or has no tag
pub fn resolve_release_url(url: &str) -> Result<String, DownloadError> {
    let (owner, repo) = parse_release_url(url)?;
    let api_url = format!("https://api.github.com/repos/{owner}/{repo}/releases/latest");

    let mut response = ureq::get(api_url.as_str())
        .header("user-agent", USER_AGENT)
        .call()
        .map_err(map_transport_error)?;

    let body = response
        .body_mut()
        .read_to_string()
        .map_err(map_transport_error)?;

    let metadata: serde_json::Value =
        serde_json::from_str(&body).map_err(|source| DownloadError::Metadata { source })?;
    let tag = metadata
        .get("tag_name")
        .and_then(serde_json::Value::as_str)
        .ok_or(DownloadError::MissingTag)?;

    Ok(substitute_version(url, tag))
}

/// Stream `url` to `dest` in fixed-size chunks, then chown the destination
/// to `identity`.
///
/// Progress is logged as a percentage when the response declares a content
/// length, and as a raw byte count otherwise. Returns the number of bytes
/// written.
///
/// # Errors
///
/// Returns a [`RemakeError`] wrapping [`DownloadError`] for transport or
/// write failures, or the chown failure on the completed file.
pub fn fetch(url: &str, dest: &Path, identity: &Identity) -> Result<u64, RemakeError> {
    let mut response = ureq::get(url)
        .header("user-agent", USER_AGENT)
        .call()
        .map_err(map_transport_error)?;

    let total_size: Option<u64> = response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok());

    let mut out = std::fs::File::create(dest).map_err(|source| DownloadError::Io {
        path: dest.to_path_buf(),
        source,
    })?;

    let mut reader = response.body_mut().as_reader();
    let mut buffer = [0u8; CHUNK_SIZE];
    let mut downloaded: u64 = 0;
    let mut last_reported: u64 = 0;

    loop {
        let read = reader
            .read(&mut buffer)
            .map_err(|source| DownloadError::Io {
                path: dest.to_path_buf(),
                source,
            })?;
        if read == 0 {
            break;
        }
        out.write_all(&buffer[..read])
            .map_err(|source| DownloadError::Io {
                path: dest.to_path_buf(),
                source,
            })?;
        downloaded += read as u64;

        match total_size {
            Some(total) if total > 0 => {
                let percent = downloaded * 100 / total;
                if percent > last_reported {
                    last_reported = percent;
                    tracing::debug!("downloading: {percent}% ({downloaded}/{total} bytes)");
                }
            }
            _ => {
                // No declared length: report once per mebibyte.
                if downloaded / (1024 * 1024) > last_reported {
                    last_reported = downloaded / (1024 * 1024);
                    tracing::debug!("downloading: {downloaded} bytes");
                }
            }
        }
    }

    fsops::chown_tree(dest, identity)?;
    tracing::debug!("download complete: {} ({downloaded} bytes)", dest.display());
    Ok(downloaded)
}

/// Substitute the version token with `tag`, stripping a single leading `v`.
#[must_use]
pub fn substitute_version(url: &str, tag: &str) -> String {
    let version = tag.strip_prefix('v').unwrap_or(tag);
    url.replace(VERSION_TOKEN, version)
}

/// Parse `owner` and `repo` out of a release-download URL.
fn parse_release_url(url: &str) -> Result<(&str, &str), DownloadError> {
    let template_error = || DownloadError::TemplateFormat {
        url: url.to_string(),
    };

    let rest = url
        .strip_prefix("https://github.com/")
        .ok_or_else(template_error)?;
    let mut parts = rest.splitn(3, '/');
    let owner = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(template_error)?;
    let repo = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(template_error)?;
    let tail = parts.next().ok_or_else(template_error)?;
    if !tail.starts_with("releases/download/") {
        return Err(template_error());
    }
    Ok((owner, repo))
}

fn map_transport_error(err: ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(code) => DownloadError::UnexpectedStatus { code },
        other => DownloadError::Network {
            source: Box::new(other),
        },
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_release_url_extracts_owner_and_repo() {
        let (owner, repo) = parse_release_url(
            "https://github.com/sharkdp/fd/releases/download/{version}/fd.tar.gz",
        )
        .unwrap();
        assert_eq!(owner, "sharkdp");
        assert_eq!(repo, "fd");
    }

    #[test]
    fn parse_release_url_rejects_other_hosts() {
        let err = parse_release_url("https://example.com/o/r/releases/download/x").unwrap_err();
        assert!(matches!(err, DownloadError::TemplateFormat { .. }));
    }

    #[test]
    fn parse_release_url_rejects_non_release_paths() {
        let err = parse_release_url("https://github.com/o/r/archive/main.zip").unwrap_err();
        assert!(matches!(err, DownloadError::TemplateFormat { .. }));
    }

    #[test]
    fn parse_release_url_rejects_missing_repo() {
        let err = parse_release_url("https://github.com/o").unwrap_err();
        assert!(matches!(err, DownloadError::TemplateFormat { .. }));
    }

    #[test]
    fn parse_release_url_rejects_empty_owner() {
        let err = parse_release_url("https://github.com//r/releases/download/x").unwrap_err();
        assert!(matches!(err, DownloadError::TemplateFormat { .. }));
    }

    #[test]
    fn substitute_version_strips_single_v_prefix() {
        let url = "https://github.com/o/r/releases/download/{version}/tool-{version}.zip";
        assert_eq!(
            substitute_version(url, "v2.1.0"),
            "https://github.com/o/r/releases/download/2.1.0/tool-2.1.0.zip"
        );
    }

    #[test]
    fn substitute_version_keeps_unprefixed_tag() {
        let url = "https://github.com/o/r/releases/download/{version}/t.zip";
        assert_eq!(
            substitute_version(url, "2024.05"),
            "https://github.com/o/r/releases/download/2024.05/t.zip"
        );
    }

    #[test]
    fn substitute_version_strips_only_one_leading_v() {
        // Known format assumption: only a single leading 'v' is removed.
        let url = "{version}";
        assert_eq!(substitute_version(url, "vv1"), "v1");
    }
}
