//! Error taxonomy for a Geckodriver installation run.
//!
//! `VersionResolutionError` is fatal to the whole run. Everything wrapped in
//! `BucketError` is scoped to a single OS bucket and is recorded as that
//! bucket's failure while the run continues with the next bucket.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to determine which release to install.
#[derive(Debug, Error)]
pub enum VersionResolutionError {
    #[error("failed to query latest release from {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: DownloadError,
    },
    #[error(
        "GitHub release JSON property \"tag_name\" is not defined. Unable to discover the latest version from {url}"
    )]
    MissingTagName { url: String },
}

/// Transport-level failure while fetching a URL.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("download of {url} failed with HTTP {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error(
        "download timeout: no data received for {secs} seconds from {url} ({downloaded} bytes received)"
    )]
    Timeout {
        url: String,
        secs: u64,
        downloaded: u64,
    },
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Failure while pulling the driver executable out of a downloaded archive.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("cannot infer archive format from slug {slug}")]
    UnsupportedFormat { slug: String },
    #[error("no {binary} executable found in {}", archive.display())]
    BinaryNotFound { binary: String, archive: PathBuf },
    #[error("failed to read zip archive {}: {source}", archive.display())]
    Archive {
        archive: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("{context} {}: {source}", path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ExtractError {
    pub(crate) fn io(context: &'static str, path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Failure while moving the extracted executable into its final place.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("failed to rename {} to {}: {source}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to mark {} executable: {source}", path.display())]
    Permissions {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reason recorded for a failed bucket.
#[derive(Debug, Error)]
pub enum BucketError {
    #[error(transparent)]
    Download(#[from] DownloadError),
    #[error(transparent)]
    Extraction(#[from] ExtractError),
    #[error(transparent)]
    Install(#[from] InstallError),
}
