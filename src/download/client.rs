//! HTTP client wrapper for link probes and streamed downloads.
//!
//! This module provides the `HttpClient` struct which owns the single
//! connection-pooled `reqwest::Client` shared by every probe and download.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::redirect::Policy;
use reqwest::{Client, Response};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::error::FetchError;
use crate::config::FetchConfig;
use crate::user_agent;

/// HTTP client for HEAD probes and streaming downloads.
///
/// This client is designed to be created once and reused for every request,
/// taking advantage of connection pooling. Cloning is cheap and shares the pool.
///
/// The client-wide timeout is the probe timeout; streamed GETs override it
/// per request with the longer download timeout.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    download_timeout: Duration,
}

impl HttpClient {
    /// Creates a new HTTP client from `config`.
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` builder error if the TLS backend or resolver
    /// cannot be initialized.
    #[instrument(level = "debug", skip(config))]
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let redirect = if config.follow_redirects() {
            Policy::limited(config.max_redirects())
        } else {
            Policy::none()
        };
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.check_timeout())
            .redirect(redirect)
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()?;
        debug!(
            check_timeout_ms = config.check_timeout().as_millis(),
            download_timeout_ms = config.download_timeout().as_millis(),
            follow_redirects = config.follow_redirects(),
            "built HTTP client"
        );
        Ok(Self {
            client,
            download_timeout: config.download_timeout(),
        })
    }

    /// Sends a HEAD request and returns the final status code.
    ///
    /// Any status, success or not, is returned as `Ok`; only transport
    /// failures are errors.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if `url` cannot be parsed, and
    /// [`FetchError::Transport`]/[`FetchError::Timeout`] on network failure.
    #[instrument(level = "debug", skip(self), fields(url = %url))]
    pub async fn head_status(&self, url: &str) -> Result<u16, FetchError> {
        let parsed = parse_url(url)?;
        let response = self
            .client
            .head(parsed)
            .send()
            .await
            .map_err(|e| FetchError::transport(url, e))?;
        let status = response.status().as_u16();
        debug!(status, "HEAD response");
        Ok(status)
    }

    /// Opens a streaming GET with the download timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::HttpStatus`] for a non-2xx response, plus the
    /// errors of [`head_status`](Self::head_status).
    #[instrument(level = "debug", skip(self), fields(url = %url))]
    pub async fn get_stream(&self, url: &str) -> Result<Response, FetchError> {
        let parsed = parse_url(url)?;
        let response = self
            .client
            .get(parsed)
            .timeout(self.download_timeout)
            .send()
            .await
            .map_err(|e| FetchError::transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(url, status.as_u16()));
        }
        Ok(response)
    }

    /// Streams `url` into the file at `path`, returning bytes written.
    ///
    /// The body is copied chunk by chunk into a uniquely named partial file
    /// beside `path`, which is renamed over `path` only once the body is
    /// complete. On failure only the partial file is removed, so an existing
    /// file at `path` (for example one written by another link that maps to
    /// the same name) is never truncated or deleted.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Filesystem`] when the file cannot be created,
    /// written, or moved into place, plus the errors of
    /// [`get_stream`](Self::get_stream).
    #[instrument(skip(self), fields(url = %url, path = %path.display()))]
    pub async fn download_to_path(&self, url: &str, path: &Path) -> Result<u64, FetchError> {
        let response = self.get_stream(url).await?;

        let part_path = partial_path(path);
        let mut file = File::create(&part_path)
            .await
            .map_err(|e| FetchError::filesystem(path, e))?;

        let stream_result = stream_to_file(&mut file, response, url, path).await;
        drop(file);
        let bytes = match stream_result {
            Ok(bytes) => bytes,
            Err(error) => {
                debug!(path = %part_path.display(), "cleaning up partial file after error");
                let _ = tokio::fs::remove_file(&part_path).await;
                return Err(error);
            }
        };

        if let Err(e) = tokio::fs::rename(&part_path, path).await {
            let _ = tokio::fs::remove_file(&part_path).await;
            return Err(FetchError::filesystem(path, e));
        }

        info!(path = %path.display(), bytes, "download complete");
        Ok(bytes)
    }
}

/// Sibling path for an in-flight download, unique per process and call.
fn partial_path(path: &Path) -> PathBuf {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    let mut name = path
        .file_name()
        .map(OsStr::to_os_string)
        .unwrap_or_default();
    name.push(format!(".{}-{seq}.part", std::process::id()));
    path.with_file_name(name)
}

fn parse_url(url: &str) -> Result<Url, FetchError> {
    Url::parse(url).map_err(|_| FetchError::invalid_url(url))
}

/// Streams response body to file, returning bytes written.
///
/// Extracted so the caller can remove the partial file on any error.
async fn stream_to_file(
    file: &mut File,
    response: Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, FetchError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| FetchError::body_read(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| FetchError::filesystem(file_path, e))?;

        bytes_written += chunk.len() as u64;
    }

    // Ensure all data is flushed to disk
    writer
        .flush()
        .await
        .map_err(|e| FetchError::filesystem(file_path, e))?;

    Ok(bytes_written)
}
