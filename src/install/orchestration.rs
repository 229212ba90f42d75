//! Per-bucket download → extract → install pipeline
//!
//! Buckets are processed one at a time in table order. A failing bucket is
//! logged as soon as it fails, recorded, and the loop moves on, so `--all`
//! installs as many drivers as it can.

use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use super::binaries::{archive_file_name, download_url, qualified_name};
use super::download::{Extractor, HostId, OsBucket, Platform, Transport, Version, target_platforms};
use crate::config::RunOptions;
use crate::error::{BucketError, DownloadError, InstallError};

/// What happened to one bucket.
#[derive(Debug)]
pub enum Outcome {
    Success { binary: PathBuf },
    Failure(BucketError),
}

#[derive(Debug)]
pub struct Attempt {
    pub bucket: OsBucket,
    pub outcome: Outcome,
}

impl Attempt {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }
}

/// Everything a single run produced, in processing order.
#[derive(Debug)]
pub struct RunResult {
    pub version: Version,
    pub options: RunOptions,
    pub attempts: Vec<Attempt>,
}

impl RunResult {
    pub fn successes(&self) -> Vec<OsBucket> {
        self.attempts
            .iter()
            .filter(|a| a.is_success())
            .map(|a| a.bucket)
            .collect()
    }

    pub fn failures(&self) -> Vec<OsBucket> {
        self.attempts
            .iter()
            .filter(|a| !a.is_success())
            .map(|a| a.bucket)
            .collect()
    }
}

pub struct Orchestrator<'a, T: ?Sized, X: ?Sized> {
    transport: &'a T,
    extractor: &'a X,
    options: &'a RunOptions,
}

impl<'a, T, X> Orchestrator<'a, T, X>
where
    T: Transport + ?Sized,
    X: Extractor + ?Sized,
{
    pub fn new(transport: &'a T, extractor: &'a X, options: &'a RunOptions) -> Self {
        Self {
            transport,
            extractor,
            options,
        }
    }

    /// Install `version` for the host bucket, or for every bucket when
    /// `install_all` is set.
    pub async fn run(&self, version: Version, host: HostId) -> RunResult {
        if let Some(notice) = host.fallback_notice() {
            warn!("{notice}");
        }

        let targets = target_platforms(self.options.install_all, host);
        let mut attempts = Vec::with_capacity(targets.len());

        for platform in targets {
            info!("Installing Geckodriver {version} for {}", platform.bucket);

            let outcome = match self.install_platform(&version, platform).await {
                Ok(binary) => {
                    info!("Installed {}", binary.display());
                    Outcome::Success { binary }
                }
                Err(e) => {
                    error!("Geckodriver installation for {} failed: {e}", platform.bucket);
                    Outcome::Failure(e)
                }
            };

            attempts.push(Attempt {
                bucket: platform.bucket,
                outcome,
            });
        }

        RunResult {
            version,
            options: self.options.clone(),
            attempts,
        }
    }

    async fn install_platform(
        &self,
        version: &Version,
        platform: &Platform,
    ) -> Result<PathBuf, BucketError> {
        let dir = &self.options.output_directory;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| DownloadError::io(dir, e))?;

        let url = download_url(version.as_str(), platform.slug);
        let archive = dir.join(archive_file_name(&url));

        // The archive never outlives this bucket, whether the download or
        // the extraction failed midway or both succeeded.
        let extracted = self.fetch_and_extract(&url, &archive, platform.slug).await;
        remove_archive(&archive).await;

        Ok(install_binary(dir, &extracted?, platform.bucket).await?)
    }

    async fn fetch_and_extract(
        &self,
        url: &str,
        archive: &Path,
        slug: &str,
    ) -> Result<String, BucketError> {
        debug!("Downloading {url} to {}", archive.display());
        self.transport.download_to(url, archive).await?;
        Ok(self
            .extractor
            .extract(archive, slug, &self.options.output_directory)
            .await?)
    }
}

async fn remove_archive(archive: &Path) {
    match tokio::fs::remove_file(archive).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove archive {}: {e}", archive.display()),
    }
}

/// Rename the extracted binary to its bucket-qualified name and mark it
/// executable.
///
/// The two steps are not atomic: an interruption in between leaves a
/// non-executable binary that the next run replaces.
pub async fn install_binary(
    dir: &Path,
    binary: &str,
    bucket: OsBucket,
) -> Result<PathBuf, InstallError> {
    let from = dir.join(binary);
    let to = dir.join(qualified_name(binary, bucket));

    tokio::fs::rename(&from, &to)
        .await
        .map_err(|source| InstallError::Rename {
            from: from.clone(),
            to: to.clone(),
            source,
        })?;

    make_executable(&to).await?;
    Ok(to)
}

#[cfg(unix)]
async fn make_executable(path: &Path) -> Result<(), InstallError> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .await
        .map_err(|source| InstallError::Permissions {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(not(unix))]
async fn make_executable(_path: &Path) -> Result<(), InstallError> {
    Ok(())
}
