//! Fetch dispatcher for concurrent link checks and downloads.
//!
//! This module provides the `FetchDispatcher` which runs one task per unique
//! link, bounded by a semaphore, and collects exactly one status record per
//! link in completion order.
//!
//! # Example
//!
//! ```no_run
//! use std::collections::BTreeSet;
//!
//! use pdf_link_fetcher::{CandidateUrl, FetchConfig, FetchDispatcher, HttpClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FetchConfig::default().with_output_dir("./downloads");
//! let client = HttpClient::new(&config)?;
//! let dispatcher = FetchDispatcher::new(client, &config)?;
//!
//! let urls: BTreeSet<CandidateUrl> = ["https://example.com/a.pdf"]
//!     .into_iter()
//!     .filter_map(CandidateUrl::parse)
//!     .collect();
//! for status in dispatcher.check_links(&urls).await {
//!     println!("{} -> {:?}", status.url(), status.status());
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{Id, JoinSet};
use tracing::{debug, info, instrument, warn};

use super::client::HttpClient;
use super::error::FetchError;
use super::filename::generate_filename;
use super::status::{DownloadStatus, LinkStatus};
use crate::config::{ConfigError, FetchConfig};
use crate::parser::CandidateUrl;
use crate::resolver::resolve_url;

/// Dispatcher for concurrent probes and downloads over a set of links.
///
/// # Concurrency Model
///
/// - Each link runs in its own Tokio task inside a `JoinSet`
/// - A semaphore permit is acquired before the task does any network I/O
/// - Permits are released automatically when the task completes (RAII)
/// - Dropping a batch future aborts every task still in flight
///
/// A failure for one link never affects another; a panicking task is
/// reported as an unexpected failure for its own link.
#[derive(Debug, Clone)]
pub struct FetchDispatcher {
    client: HttpClient,
    output_dir: Arc<Path>,
    semaphore: Arc<Semaphore>,
    concurrency: usize,
}

impl FetchDispatcher {
    /// Creates a dispatcher borrowing `client` and using `config` for the
    /// output directory and concurrency limit.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails validation.
    #[instrument(level = "debug", skip(client, config))]
    pub fn new(client: HttpClient, config: &FetchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        debug!(
            concurrency = config.concurrency(),
            output_dir = %config.output_dir().display(),
            "creating fetch dispatcher"
        );
        Ok(Self {
            client,
            output_dir: Arc::from(config.output_dir()),
            semaphore: Arc::new(Semaphore::new(config.concurrency())),
            concurrency: config.concurrency(),
        })
    }

    /// Returns the configured concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns the directory downloads are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Probes every link with a HEAD request against its resolved URL.
    ///
    /// Returns one [`LinkStatus`] per link, keyed by the original link
    /// string. An empty set returns immediately without network access.
    #[instrument(skip(self, urls), fields(links = urls.len()))]
    pub async fn check_links(&self, urls: &BTreeSet<CandidateUrl>) -> Vec<LinkStatus> {
        if urls.is_empty() {
            return Vec::new();
        }
        info!("starting link checks");

        let results = self
            .run_batch(
                urls,
                |url| {
                    let client = self.client.clone();
                    async move { check_one(&client, &url).await }
                },
                |url, error| LinkStatus::from_error(url.as_str(), error),
            )
            .await;

        let ok = results.iter().filter(|status| status.is_ok()).count();
        info!(ok, failed = results.len() - ok, "link checks complete");
        results
    }

    /// Downloads every link into the output directory.
    ///
    /// The output directory is created first if absent. Each link gets a HEAD
    /// pre-flight against its resolved URL; only a 2xx answer leads to the
    /// streamed GET. Returns one [`DownloadStatus`] per link. An empty set
    /// returns immediately without touching the network or the filesystem.
    #[instrument(skip(self, urls), fields(links = urls.len(), output_dir = %self.output_dir.display()))]
    pub async fn download_links(&self, urls: &BTreeSet<CandidateUrl>) -> Vec<DownloadStatus> {
        if urls.is_empty() {
            return Vec::new();
        }

        if let Err(e) = tokio::fs::create_dir_all(&self.output_dir).await {
            warn!(error = %e, "cannot create output directory");
            let error = FetchError::filesystem(self.output_dir.to_path_buf(), e);
            return urls
                .iter()
                .map(|url| DownloadStatus::from_error(url.as_str(), &error))
                .collect();
        }
        info!("starting downloads");

        let results = self
            .run_batch(
                urls,
                |url| {
                    let client = self.client.clone();
                    let output_dir = Arc::clone(&self.output_dir);
                    async move {
                        match download_one(&client, &url, &output_dir).await {
                            Ok(path) => DownloadStatus::downloaded(url.as_str(), &path),
                            Err(e) => {
                                warn!(url = %url, error = %e, "download failed");
                                DownloadStatus::from_error(url.as_str(), &e)
                            }
                        }
                    }
                },
                |url, error| DownloadStatus::from_error(url.as_str(), error),
            )
            .await;

        let downloaded = results.iter().filter(|s| s.is_downloaded()).count();
        info!(
            downloaded,
            failed = results.len() - downloaded,
            "downloads complete"
        );
        results
    }

    /// Spawns one task per link and collects their results in completion order.
    ///
    /// `task` builds the per-link future; `on_failure` builds the record for a
    /// link whose task could not run to completion.
    async fn run_batch<T, F, Fut, E>(
        &self,
        urls: &BTreeSet<CandidateUrl>,
        task: F,
        on_failure: E,
    ) -> Vec<T>
    where
        T: Send + 'static,
        F: Fn(CandidateUrl) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
        E: Fn(&CandidateUrl, &FetchError) -> T + Copy + Send + 'static,
    {
        let mut tasks = JoinSet::new();
        let mut pending: HashMap<Id, CandidateUrl> = HashMap::with_capacity(urls.len());

        for url in urls {
            let semaphore = Arc::clone(&self.semaphore);
            let work = task(url.clone());
            let task_url = url.clone();

            let handle = tasks.spawn(async move {
                // Permit is dropped when this block exits (RAII)
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    let error =
                        FetchError::unexpected(task_url.as_str(), "concurrency limiter closed");
                    return on_failure(&task_url, &error);
                };
                work.await
            });
            pending.insert(handle.id(), url.clone());
        }

        debug!(task_count = tasks.len(), "waiting for tasks to complete");

        let mut results = Vec::with_capacity(urls.len());
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((id, result)) => {
                    pending.remove(&id);
                    results.push(result);
                }
                // A panicked or aborted task still owes its link a record.
                Err(e) => {
                    let Some(url) = pending.remove(&e.id()) else {
                        warn!(error = %e, "untracked fetch task did not complete");
                        continue;
                    };
                    warn!(url = %url, error = %e, "fetch task did not complete");
                    let error = FetchError::unexpected(url.as_str(), "internal task failure");
                    results.push(on_failure(&url, &error));
                }
            }
        }
        results
    }
}

/// Probes one link.
async fn check_one(client: &HttpClient, url: &CandidateUrl) -> LinkStatus {
    let resolved = resolve_url(url.as_str());
    match client.head_status(&resolved).await {
        Ok(200) => {
            debug!(url = %url, "link reachable");
            LinkStatus::ok(url.as_str(), 200)
        }
        Ok(status) => {
            warn!(url = %url, status, "link check failed");
            LinkStatus::unexpected_status(url.as_str(), status)
        }
        Err(e) => {
            warn!(url = %url, error = %e, "link check failed");
            LinkStatus::from_error(url.as_str(), &e)
        }
    }
}

/// Pre-flights and downloads one link, returning the saved path.
async fn download_one(
    client: &HttpClient,
    url: &CandidateUrl,
    output_dir: &Path,
) -> Result<PathBuf, FetchError> {
    let resolved = resolve_url(url.as_str());

    let status = client.head_status(&resolved).await?;
    if !(200..300).contains(&status) {
        return Err(FetchError::http_status(resolved, status));
    }

    let path = output_dir.join(generate_filename(url.as_str()));
    debug!(url = %url, path = %path.display(), "resolved output path");
    client.download_to_path(&resolved, &path).await?;
    Ok(path)
}
