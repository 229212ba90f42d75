//! Host detection and the ordered OS-bucket → archive-slug table

use std::fmt;

use once_cell::sync::OnceCell;

/// Canonical OS classification used to pick a release artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsBucket {
    Linux,
    Mac,
    Windows,
}

/// Raw host identifier, before Mac architectures are folded together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostId {
    Linux,
    MacIntel,
    MacArm,
    Windows,
}

/// One row of the download table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub bucket: OsBucket,
    /// Suffix of the release asset name; also tells the extractor the format.
    pub slug: &'static str,
}

/// Supported buckets in processing order.
///
/// The order here is the order buckets are installed and reported in.
pub const PLATFORMS: &[Platform] = &[
    Platform {
        bucket: OsBucket::Linux,
        slug: "linux64.tar.gz",
    },
    Platform {
        bucket: OsBucket::Mac,
        slug: "macos.tar.gz",
    },
    Platform {
        bucket: OsBucket::Windows,
        slug: "win64.zip",
    },
];

static HOST_CACHE: OnceCell<HostId> = OnceCell::new();

impl HostId {
    /// Detect the current host (cached after first call)
    pub fn detect() -> Self {
        *HOST_CACHE.get_or_init(|| Self::from_consts(std::env::consts::OS, std::env::consts::ARCH))
    }

    /// Classify an `(os, arch)` pair as reported by `std::env::consts`.
    ///
    /// Anything that is neither macOS nor Windows is treated as Linux.
    pub fn from_consts(os: &str, arch: &str) -> Self {
        match (os, arch) {
            ("macos", "aarch64") => HostId::MacArm,
            ("macos", _) => HostId::MacIntel,
            ("windows", _) => HostId::Windows,
            _ => HostId::Linux,
        }
    }

    /// Notice shown when the host has no artifact of its own and another
    /// bucket's build stands in for it.
    pub fn fallback_notice(self) -> Option<&'static str> {
        match self {
            HostId::MacArm => {
                Some("ARM based macOS detected. Falling back to Intel build of Geckodriver.")
            }
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HostId::Linux => "linux",
            HostId::MacIntel => "mac-intel",
            HostId::MacArm => "mac-arm",
            HostId::Windows => "windows",
        }
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl OsBucket {
    /// Fold a raw host identifier into its bucket.
    ///
    /// No native ARM macOS artifact is tracked, so ARM Macs get the Intel
    /// build (see [`HostId::fallback_notice`]).
    pub fn normalize(host: HostId) -> Self {
        match host {
            HostId::Linux => OsBucket::Linux,
            HostId::MacIntel | HostId::MacArm => OsBucket::Mac,
            HostId::Windows => OsBucket::Windows,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OsBucket::Linux => "linux",
            OsBucket::Mac => "mac",
            OsBucket::Windows => "windows",
        }
    }
}

impl fmt::Display for OsBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Platform {
    /// Look up the table row for a bucket
    pub fn for_bucket(bucket: OsBucket) -> Option<&'static Platform> {
        PLATFORMS.iter().find(|p| p.bucket == bucket)
    }
}

/// Rows to process for this run, in table order.
///
/// With `install_all` every row is returned regardless of the host;
/// otherwise only the host's normalized bucket.
pub fn target_platforms(install_all: bool, host: HostId) -> Vec<&'static Platform> {
    if install_all {
        return PLATFORMS.iter().collect();
    }

    Platform::for_bucket(OsBucket::normalize(host))
        .into_iter()
        .collect()
}
