//! In-memory transport, archive builders and log capture shared by unit tests

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::{Mutex, Once};

use async_trait::async_trait;
use flate2::Compression;
use flate2::write::GzEncoder;

use super::binaries::download_url;
use super::download::Transport;
use crate::error::DownloadError;

/// Serves canned bodies by URL and records every request in order.
/// Unknown URLs answer 404.
#[derive(Default)]
pub struct FakeTransport {
    bodies: HashMap<String, Vec<u8>>,
    stalled: HashSet<String>,
    requests: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn with_body(mut self, url: &str, body: Vec<u8>) -> Self {
        self.bodies.insert(url.to_string(), body);
        self
    }

    /// Serve archives for all three buckets of `version`.
    pub fn with_release(self, version: &str) -> Self {
        self.with_body(
            &download_url(version, "linux64.tar.gz"),
            tar_gz_archive(&[("geckodriver", "linux driver")]),
        )
        .with_body(
            &download_url(version, "macos.tar.gz"),
            tar_gz_archive(&[("geckodriver", "mac driver")]),
        )
        .with_body(
            &download_url(version, "win64.zip"),
            zip_archive(&[("geckodriver.exe", "windows driver")]),
        )
    }

    pub fn without(mut self, url: &str) -> Self {
        self.bodies.remove(url);
        self
    }

    /// Write half of the body for `url`, then time out.
    pub fn stalling(mut self, url: &str) -> Self {
        self.stalled.insert(url.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("requests lock").clone()
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        self.requests.lock().expect("requests lock").push(url.to_string());
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| DownloadError::HttpStatus {
                url: url.to_string(),
                status: reqwest::StatusCode::NOT_FOUND,
            })
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn download(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        self.fetch(url)
    }

    async fn download_to(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        let body = self.fetch(url)?;
        if self.stalled.contains(url) {
            let partial = &body[..body.len() / 2];
            std::fs::write(dest, partial).map_err(|e| DownloadError::io(dest, e))?;
            return Err(DownloadError::Timeout {
                url: url.to_string(),
                secs: 300,
                downloaded: partial.len() as u64,
            });
        }
        std::fs::write(dest, body).map_err(|e| DownloadError::io(dest, e))
    }
}

thread_local! {
    static CAPTURED: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Records `LEVEL message` lines per thread so concurrently running tests
/// only see their own output.
struct CaptureLogger;

impl log::Log for CaptureLogger {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        let line = format!("{} {}", record.level(), record.args());
        CAPTURED.with(|c| c.borrow_mut().push(line));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static LOGGER_INIT: Once = Once::new();

/// Start capturing log lines on the current thread, dropping anything
/// captured so far.
pub fn capture_logs() {
    LOGGER_INIT.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(log::LevelFilter::Trace);
        }
    });
    CAPTURED.with(|c| c.borrow_mut().clear());
}

/// Captured lines at `level` on the current thread.
pub fn captured(level: log::Level) -> Vec<String> {
    let prefix = format!("{level} ");
    CAPTURED.with(|c| {
        c.borrow()
            .iter()
            .filter(|line| line.starts_with(&prefix))
            .cloned()
            .collect()
    })
}

pub fn tar_gz_archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, data.as_bytes())
            .expect("append tar entry");
    }
    builder
        .into_inner()
        .expect("finish tar")
        .finish()
        .expect("finish gzip")
}

pub fn zip_archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer
            .start_file(*name, zip::write::SimpleFileOptions::default())
            .expect("start zip entry");
        writer.write_all(data.as_bytes()).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}
