//! Geckodriver installation
//!
//! A run resolves the release version once, installs it for the host bucket
//! (or every bucket with `--all`), and reduces the per-bucket outcomes to a
//! summary and exit code.

pub mod binaries;
pub mod download;
pub mod orchestration;
pub mod report;

#[cfg(test)]
mod testing;

pub use download::{
    ArchiveExtractor, Extractor, HostId, HttpTransport, OsBucket, Transport, Version,
    resolve_version,
};
pub use orchestration::{Attempt, Orchestrator, Outcome, RunResult};
pub use report::{RunStatus, Summary, summarize};

use log::info;

use crate::config::RunOptions;
use crate::error::VersionResolutionError;

/// Run one installation end to end.
///
/// Version resolution failure aborts before any bucket is attempted;
/// per-bucket failures are folded into the returned summary.
pub async fn run<T, X>(
    options: &RunOptions,
    transport: &T,
    extractor: &X,
    host: HostId,
) -> Result<Summary, VersionResolutionError>
where
    T: Transport + ?Sized,
    X: Extractor + ?Sized,
{
    let version = resolve_version(options.version.as_deref(), transport).await?;

    info!(
        "Installing Geckodriver {version} into {}",
        options.output_directory.display()
    );

    let result = Orchestrator::new(transport, extractor, options)
        .run(version, host)
        .await;

    Ok(summarize(&result))
}
