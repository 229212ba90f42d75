//! HTTP transport: in-memory fetches and streaming downloads to disk

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;

use crate::config::RunOptions;
use crate::error::DownloadError;

const USER_AGENT: &str = concat!("geckodriver-install/", env!("CARGO_PKG_VERSION"));
const DOWNLOAD_CONNECT_TIMEOUT: Duration = Duration::from_secs(30); // Initial connection
const DOWNLOAD_INACTIVITY_TIMEOUT: Duration = Duration::from_secs(300); // 5 min no data

/// Remote fetches used by version discovery and the download stage.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch a URL fully into memory.
    async fn download(&self, url: &str) -> Result<Vec<u8>, DownloadError>;

    /// Stream a URL into `dest`, replacing any existing file.
    async fn download_to(&self, url: &str, dest: &Path) -> Result<(), DownloadError>;
}

/// `reqwest`-backed transport honouring the run's proxy and TLS settings.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(options: &RunOptions) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(DOWNLOAD_CONNECT_TIMEOUT)
            .user_agent(USER_AGENT);

        if let Some(proxy) = &options.proxy {
            debug!("Routing downloads through proxy {proxy}");
            builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
        }

        if !options.ssl_verify {
            if options.proxy.is_none() {
                warn!("SSL certificate verification disabled without a proxy");
            }
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| DownloadError::Request {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(DownloadError::HttpStatus {
                url: url.to_string(),
                status: response.status(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn download(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        let response = self.get(url).await?;
        let body = response.bytes().await.map_err(|source| DownloadError::Request {
            url: url.to_string(),
            source,
        })?;
        Ok(body.to_vec())
    }

    async fn download_to(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        let response = self.get(url).await?;
        let total = response.content_length();

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| DownloadError::io(dest, e))?;

        let pb = progress_bar(total);
        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        loop {
            // Wrap stream.next() with timeout to detect inactivity
            let chunk = match timeout(DOWNLOAD_INACTIVITY_TIMEOUT, stream.next()).await {
                Ok(Some(Ok(chunk))) => chunk,
                Ok(Some(Err(source))) => {
                    pb.abandon();
                    return Err(DownloadError::Request {
                        url: url.to_string(),
                        source,
                    });
                }
                Ok(None) => break,
                Err(_) => {
                    pb.abandon();
                    return Err(DownloadError::Timeout {
                        url: url.to_string(),
                        secs: DOWNLOAD_INACTIVITY_TIMEOUT.as_secs(),
                        downloaded,
                    });
                }
            };

            file.write_all(&chunk)
                .await
                .map_err(|e| DownloadError::io(dest, e))?;
            downloaded += chunk.len() as u64;
            pb.set_position(downloaded);
        }

        file.flush().await.map_err(|e| DownloadError::io(dest, e))?;
        pb.finish_and_clear();

        debug!("Downloaded {downloaded} bytes to {}", dest.display());
        Ok(())
    }
}

fn progress_bar(total: Option<u64>) -> ProgressBar {
    match total {
        Some(len) => {
            let pb = ProgressBar::new(len);
            if let Ok(style) =
                ProgressStyle::default_bar().template("   [{bar:40.green/blue}] {bytes}/{total_bytes}")
            {
                pb.set_style(style.progress_chars("█▓░"));
            }
            pb
        }
        None => ProgressBar::new_spinner(),
    }
}
