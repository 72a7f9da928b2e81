//! Local git repository inspection.
//!
//! Opens the repository rooted at a directory and reads the URLs configured
//! for its `origin` remote. The URLs are informational only; they never
//! decide which pull request is queried.

use std::path::Path;

use git2::{ErrorCode, Repository};
use tracing::{debug, info};

use crate::{error::ReportError, types::RemoteInfo};

/// Remote whose URLs are reported.
pub const ORIGIN: &str = "origin";

/// Opens the repository at `path` and resolves the URLs of its `origin`
/// remote.
///
/// The repository must be rooted at `path`; parent directories are not
/// searched. Logs an informational message when the remote has no fetch URL.
pub fn inspect_origin(path: &Path) -> Result<RemoteInfo, ReportError> {
    inspect_remote(path, ORIGIN)
}

/// Like [`inspect_origin`], for an arbitrary remote name.
pub fn inspect_remote(path: &Path, remote_name: &str) -> Result<RemoteInfo, ReportError> {
    let repo = Repository::open(path).map_err(ReportError::OpenRepository)?;
    debug!(path = %path.display(), "opened repository");

    let remote_error = |source| ReportError::Remote {
        name: remote_name.to_string(),
        source,
    };
    repo.find_remote(remote_name).map_err(remote_error)?;

    let urls = configured_urls(&repo, remote_name).map_err(remote_error)?;
    if urls.is_empty() {
        info!("No remote URL found.");
    }

    Ok(RemoteInfo {
        name: remote_name.to_string(),
        urls,
    })
}

/// Every `remote.<name>.url` entry in config order. libgit2's own remote
/// lookup only keeps the last one. Blank and non-UTF-8 entries are skipped.
fn configured_urls(repo: &Repository, remote_name: &str) -> Result<Vec<String>, git2::Error> {
    let config = repo.config()?;
    let mut entries = match config.multivar(&format!("remote.{remote_name}.url"), None) {
        Ok(entries) => entries,
        Err(err) if err.code() == ErrorCode::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };

    let mut urls = Vec::new();
    while let Some(entry) = entries.next() {
        if let Some(url) = entry?.value().map(str::trim).filter(|url| !url.is_empty()) {
            urls.push(url.to_string());
        }
    }
    Ok(urls)
}
