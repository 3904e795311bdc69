//! Specification document downloads

use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP client setup failed: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned status {status}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("Writing {path} failed: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Fetches specification documents over HTTP, one request per document
#[derive(Debug, Clone)]
pub struct SpecDownloader {
    client: reqwest::Client,
}

impl SpecDownloader {
    pub fn new(timeout: Duration) -> Result<Self, DownloadError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sdksync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(DownloadError::Client)?;
        Ok(Self { client })
    }

    /// Stream `url` into `dest`, advancing `progress` by the received byte count.
    ///
    /// Only a `200 OK` response is accepted. Returns the number of bytes written.
    pub async fn download(
        &self,
        url: &str,
        dest: &Path,
        progress: &ProgressBar,
    ) -> Result<u64, DownloadError> {
        let request_error = |source| DownloadError::Request {
            url: url.to_string(),
            source,
        };
        let write_error = |source| DownloadError::Write {
            path: dest.display().to_string(),
            source,
        };

        let mut response = self.client.get(url).send().await.map_err(request_error)?;
        if response.status() != reqwest::StatusCode::OK {
            return Err(DownloadError::UnexpectedStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        if let Some(length) = response.content_length() {
            progress.set_length(length);
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
        }

        let partial = partial_path(dest);
        let written = match stream_into(&mut response, &partial, progress).await {
            Ok(written) => written,
            Err(error) => {
                let _ = tokio::fs::remove_file(&partial).await;
                return Err(match error {
                    StreamError::Body(source) => request_error(source),
                    StreamError::Io(source) => DownloadError::Write {
                        path: partial.display().to_string(),
                        source,
                    },
                });
            }
        };
        tokio::fs::rename(&partial, dest).await.map_err(write_error)?;

        debug!(url, path = %dest.display(), bytes = written, "download complete");
        Ok(written)
    }
}

enum StreamError {
    Body(reqwest::Error),
    Io(std::io::Error),
}

/// `<dest>.part`, renamed over `dest` once the body is complete
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

async fn stream_into(
    response: &mut reqwest::Response,
    path: &Path,
    progress: &ProgressBar,
) -> Result<u64, StreamError> {
    let mut file = tokio::fs::File::create(path).await.map_err(StreamError::Io)?;
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await.map_err(StreamError::Body)? {
        file.write_all(&chunk).await.map_err(StreamError::Io)?;
        written += chunk.len() as u64;
        progress.inc(chunk.len() as u64);
    }
    file.flush().await.map_err(StreamError::Io)?;
    Ok(written)
}
