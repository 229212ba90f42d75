//! Archive extraction for release downloads
//!
//! Geckodriver ships gzip-compressed tarballs for Linux and macOS and a zip
//! for Windows. The format is inferred from the slug suffix.

use std::fs::File;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use flate2::read::GzDecoder;
use log::debug;
use tar::Archive;
use zip::ZipArchive;

use crate::error::ExtractError;
use crate::install::binaries::{DRIVER_NAME, is_driver_binary};

/// Pulls the driver executable out of a downloaded archive.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract into `dest_dir` and return the executable's file name.
    async fn extract(&self, archive: &Path, slug: &str, dest_dir: &Path)
    -> Result<String, ExtractError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveFormat {
    TarGz,
    Zip,
}

impl ArchiveFormat {
    fn from_slug(slug: &str) -> Option<Self> {
        if slug.ends_with(".tar.gz") {
            Some(Self::TarGz)
        } else if slug.ends_with(".zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }
}

/// Extractor for `.tar.gz` and `.zip` release archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveExtractor;

#[async_trait]
impl Extractor for ArchiveExtractor {
    async fn extract(
        &self,
        archive: &Path,
        slug: &str,
        dest_dir: &Path,
    ) -> Result<String, ExtractError> {
        let format = ArchiveFormat::from_slug(slug).ok_or_else(|| ExtractError::UnsupportedFormat {
            slug: slug.to_string(),
        })?;

        let archive = archive.to_path_buf();
        let dest_dir = dest_dir.to_path_buf();

        // Decompression is CPU-bound
        tokio::task::spawn_blocking(move || match format {
            ArchiveFormat::TarGz => extract_tar_gz(&archive, &dest_dir),
            ArchiveFormat::Zip => extract_zip(&archive, &dest_dir),
        })
        .await?
    }
}

fn extract_tar_gz(archive: &Path, dest_dir: &Path) -> Result<String, ExtractError> {
    let file =
        File::open(archive).map_err(|e| ExtractError::io("failed to open archive", archive, e))?;
    let mut tar = Archive::new(GzDecoder::new(file));
    let entries = tar
        .entries()
        .map_err(|e| ExtractError::io("failed to read archive", archive, e))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| ExtractError::io("failed to read archive", archive, e))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let Some(name) = entry
            .path()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        else {
            continue;
        };
        if !is_driver_binary(&name) {
            continue;
        }

        let target = dest_dir.join(&name);
        entry
            .unpack(&target)
            .map_err(|e| ExtractError::io("failed to unpack", &target, e))?;
        debug!("Extracted {} from {}", name, archive.display());
        return Ok(name);
    }

    Err(not_found(archive))
}

fn extract_zip(archive: &Path, dest_dir: &Path) -> Result<String, ExtractError> {
    let file =
        File::open(archive).map_err(|e| ExtractError::io("failed to open archive", archive, e))?;
    let mut zip = ZipArchive::new(file).map_err(|source| ExtractError::Archive {
        archive: archive.to_path_buf(),
        source,
    })?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|source| ExtractError::Archive {
            archive: archive.to_path_buf(),
            source,
        })?;
        if entry.is_dir() {
            continue;
        }

        // Match either a root entry or one nested in a directory
        let Some(name) = Path::new(entry.name())
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
        else {
            continue;
        };
        if !is_driver_binary(&name) {
            continue;
        }

        let target = dest_dir.join(&name);
        let mut out = File::create(&target)
            .map_err(|e| ExtractError::io("failed to create", &target, e))?;
        std::io::copy(&mut entry, &mut out)
            .map_err(|e| ExtractError::io("failed to write", &target, e))?;
        debug!("Extracted {} from {}", name, archive.display());
        return Ok(name);
    }

    Err(not_found(archive))
}

fn not_found(archive: &Path) -> ExtractError {
    ExtractError::BinaryNotFound {
        binary: DRIVER_NAME.to_string(),
        archive: PathBuf::from(archive),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::install::testing::{tar_gz_archive, zip_archive};

    #[test]
    fn format_follows_slug_suffix() {
        assert_eq!(ArchiveFormat::from_slug("linux64.tar.gz"), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::from_slug("macos.tar.gz"), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::from_slug("win64.zip"), Some(ArchiveFormat::Zip));
        assert_eq!(ArchiveFormat::from_slug("macos.dmg"), None);
    }

    #[tokio::test]
    async fn extracts_driver_from_tarball() {
        let dir = tempdir().expect("create temp dir");
        let archive = dir.path().join("geckodriver-v0.33.0-linux64.tar.gz");
        std::fs::write(
            &archive,
            tar_gz_archive(&[("README.md", "docs"), ("geckodriver", "ELF linux driver")]),
        )
        .expect("write archive");

        let name = ArchiveExtractor
            .extract(&archive, "linux64.tar.gz", dir.path())
            .await
            .expect("extract tarball");

        assert_eq!(name, "geckodriver");
        let contents =
            std::fs::read_to_string(dir.path().join("geckodriver")).expect("read binary");
        assert_eq!(contents, "ELF linux driver");
        assert!(!dir.path().join("README.md").exists());
    }

    #[tokio::test]
    async fn extracts_nested_exe_from_zip() {
        let dir = tempdir().expect("create temp dir");
        let archive = dir.path().join("geckodriver-v0.33.0-win64.zip");
        std::fs::write(&archive, zip_archive(&[("bin/geckodriver.exe", "MZ windows driver")]))
            .expect("write archive");

        let name = ArchiveExtractor
            .extract(&archive, "win64.zip", dir.path())
            .await
            .expect("extract zip");

        assert_eq!(name, "geckodriver.exe");
        let contents =
            std::fs::read_to_string(dir.path().join("geckodriver.exe")).expect("read binary");
        assert_eq!(contents, "MZ windows driver");
    }

    #[tokio::test]
    async fn unknown_slug_is_rejected() {
        let dir = tempdir().expect("create temp dir");
        let err = ArchiveExtractor
            .extract(&dir.path().join("x.dmg"), "macos.dmg", dir.path())
            .await
            .expect_err("dmg is not supported");

        assert!(matches!(err, ExtractError::UnsupportedFormat { ref slug } if slug == "macos.dmg"));
    }

    #[tokio::test]
    async fn archive_without_driver_is_an_error() {
        let dir = tempdir().expect("create temp dir");
        let archive = dir.path().join("empty.zip");
        std::fs::write(&archive, zip_archive(&[("LICENSE", "MPL")])).expect("write archive");

        let err = ArchiveExtractor
            .extract(&archive, "win64.zip", dir.path())
            .await
            .expect_err("no driver inside");

        assert!(matches!(err, ExtractError::BinaryNotFound { .. }));
    }

    #[tokio::test]
    async fn corrupt_zip_is_an_error() {
        let dir = tempdir().expect("create temp dir");
        let archive = dir.path().join("corrupt.zip");
        std::fs::write(&archive, b"definitely not a zip").expect("write archive");

        let err = ArchiveExtractor
            .extract(&archive, "win64.zip", dir.path())
            .await
            .expect_err("corrupt archive");

        assert!(matches!(err, ExtractError::Archive { .. }));
    }
}
