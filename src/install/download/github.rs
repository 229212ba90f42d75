//! GitHub release discovery

use std::fmt;

use log::{debug, info};
use serde::Deserialize;

use super::core::Transport;
use crate::error::VersionResolutionError;
use crate::install::binaries::LATEST_RELEASE_URL;

/// Release tag such as `v0.33.0`. Never empty; otherwise opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version(String);

impl Version {
    /// Wrap a tag, rejecting the empty string.
    pub fn new(tag: impl Into<String>) -> Option<Self> {
        let tag = tag.into();
        (!tag.is_empty()).then_some(Self(tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The only part of the release payload we care about
#[derive(Deserialize, Debug)]
struct GitHubRelease {
    #[serde(default)]
    tag_name: Option<String>,
}

/// Pick the version to install.
///
/// An explicit non-empty tag is returned as-is without touching the
/// network. Otherwise the latest release is queried once.
pub async fn resolve_version<T: Transport + ?Sized>(
    explicit: Option<&str>,
    transport: &T,
) -> Result<Version, VersionResolutionError> {
    if let Some(version) = explicit.and_then(|tag| Version::new(tag)) {
        debug!("Using requested Geckodriver version {version}");
        return Ok(version);
    }

    latest_version(transport, LATEST_RELEASE_URL).await
}

async fn latest_version<T: Transport + ?Sized>(
    transport: &T,
    url: &str,
) -> Result<Version, VersionResolutionError> {
    let body = transport
        .download(url)
        .await
        .map_err(|source| VersionResolutionError::Request {
            url: url.to_string(),
            source,
        })?;

    let version = serde_json::from_slice::<GitHubRelease>(&body)
        .ok()
        .and_then(|release| release.tag_name)
        .and_then(|tag| Version::new(tag))
        .ok_or_else(|| VersionResolutionError::MissingTagName {
            url: url.to_string(),
        })?;

    info!("Latest Geckodriver release is {version}");
    Ok(version)
}
