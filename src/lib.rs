//! Geckodriver installer library
//!
//! Resolves a Geckodriver release, downloads the archive for the host (or
//! every supported OS), extracts the driver and installs it under an
//! OS-qualified, executable name.

pub mod cli;
pub mod config;
pub mod error;
pub mod install;

pub use config::{InstallerConfig, RunOptions};
pub use error::{BucketError, DownloadError, ExtractError, InstallError, VersionResolutionError};
