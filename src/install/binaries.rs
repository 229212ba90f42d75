//! Canonical Geckodriver release locations and file naming
//!
//! Everything that depends on the upstream release layout lives here.

use super::download::platform::OsBucket;

/// Executable name inside every release archive (plus `.exe` on Windows)
pub const DRIVER_NAME: &str = "geckodriver";

/// GitHub API endpoint describing the latest release
pub const LATEST_RELEASE_URL: &str =
    "https://api.github.com/repos/mozilla/geckodriver/releases/latest";

const DOWNLOAD_URL_TEMPLATE: &str =
    "https://github.com/mozilla/geckodriver/releases/download/{version}/geckodriver-{version}-{os}";

/// Archive URL for a release version and platform slug.
pub fn download_url(version: &str, slug: &str) -> String {
    DOWNLOAD_URL_TEMPLATE
        .replace("{version}", version)
        .replace("{os}", slug)
}

/// Last path segment of a URL, used as the on-disk archive name.
pub fn archive_file_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Whether an archive entry's file name is the driver executable.
pub fn is_driver_binary(file_name: &str) -> bool {
    file_name == DRIVER_NAME || file_name == format!("{DRIVER_NAME}.exe")
}

/// Bucket-qualified name for an extracted binary, e.g.
/// `geckodriver.exe` → `geckodriver-windows.exe`.
///
/// Distinct per bucket so that `--all` can share one output directory.
pub fn qualified_name(binary: &str, bucket: OsBucket) -> String {
    binary.replacen(DRIVER_NAME, &format!("{DRIVER_NAME}-{bucket}"), 1)
}
