//! Service facade: link extraction plus dispatch, bound to the client lifecycle.
//!
//! [`PdfLinkService`] is what a transport layer (the bundled CLI, or an HTTP
//! handler) holds. It is started once, serves any number of batches, and is
//! shut down once.

use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::{ConfigError, FetchConfig};
use crate::download::{
    CheckLinksResponse, ClientLifecycle, DownloadLinksResponse, FetchDispatcher, LifecycleError,
};
use crate::parser::{CandidateUrl, InputRecord, extract_links};

/// Errors raised by the service itself, as opposed to per-link failures.
///
/// Per-link failures never surface here; they are records in the response.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A batch was submitted before `start` or after `shutdown`.
    #[error("HTTP client is not initialized; start the service before submitting links")]
    NotInitialized,

    /// The shared HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The batch did not finish before its deadline; in-flight work was aborted.
    #[error("batch cancelled after {}s deadline", .deadline.as_secs())]
    Cancelled {
        /// The deadline that elapsed.
        deadline: Duration,
    },
}

impl From<LifecycleError> for ServiceError {
    fn from(error: LifecycleError) -> Self {
        match error {
            LifecycleError::NotInitialized => Self::NotInitialized,
            LifecycleError::Build(source) => Self::ClientBuild(source),
        }
    }
}

/// Checks and downloads the PDF links carried by input records.
#[derive(Debug)]
pub struct PdfLinkService {
    config: FetchConfig,
    lifecycle: ClientLifecycle,
}

impl PdfLinkService {
    /// Creates a stopped service.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Config`] if `config` fails validation.
    pub fn new(config: FetchConfig) -> Result<Self, ServiceError> {
        config.validate()?;
        Ok(Self {
            config,
            lifecycle: ClientLifecycle::new(),
        })
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Builds the shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::ClientBuild`] if the client cannot be built.
    pub fn start(&self) -> Result<(), ServiceError> {
        self.lifecycle.start(&self.config)?;
        Ok(())
    }

    /// Releases the shared HTTP client. Later batches fail with
    /// [`ServiceError::NotInitialized`].
    pub fn shutdown(&self) {
        self.lifecycle.shutdown();
    }

    /// Returns true between `start` and `shutdown`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lifecycle.is_running()
    }

    /// Checks every unique link in `records`.
    ///
    /// Records without links yield an empty response without any network
    /// access, even when the service is not started.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotInitialized`] if links were found but the
    /// service is not started.
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn check_links(
        &self,
        records: &[InputRecord],
    ) -> Result<CheckLinksResponse, ServiceError> {
        let urls = extract_links(records);
        let Some(dispatcher) = self.dispatcher_for(&urls)? else {
            return Ok(CheckLinksResponse {
                results: Vec::new(),
            });
        };
        let results = dispatcher.check_links(&urls).await;
        Ok(CheckLinksResponse { results })
    }

    /// Downloads every unique link in `records` into the output directory.
    ///
    /// # Errors
    ///
    /// Same as [`check_links`](Self::check_links).
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn download_links(
        &self,
        records: &[InputRecord],
    ) -> Result<DownloadLinksResponse, ServiceError> {
        let urls = extract_links(records);
        let Some(dispatcher) = self.dispatcher_for(&urls)? else {
            return Ok(DownloadLinksResponse {
                results: Vec::new(),
            });
        };
        let results = dispatcher.download_links(&urls).await;
        Ok(DownloadLinksResponse { results })
    }

    /// [`check_links`](Self::check_links) bounded by `deadline`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Cancelled`] if the deadline elapses first;
    /// every in-flight probe is aborted and no partial response is returned.
    pub async fn check_links_with_deadline(
        &self,
        records: &[InputRecord],
        deadline: Duration,
    ) -> Result<CheckLinksResponse, ServiceError> {
        with_deadline(deadline, self.check_links(records)).await
    }

    /// [`download_links`](Self::download_links) bounded by `deadline`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Cancelled`] if the deadline elapses first.
    /// Files that completed before the deadline stay on disk.
    pub async fn download_links_with_deadline(
        &self,
        records: &[InputRecord],
        deadline: Duration,
    ) -> Result<DownloadLinksResponse, ServiceError> {
        with_deadline(deadline, self.download_links(records)).await
    }

    fn dispatcher_for(
        &self,
        urls: &BTreeSet<CandidateUrl>,
    ) -> Result<Option<FetchDispatcher>, ServiceError> {
        if urls.is_empty() {
            debug!("no links to process");
            return Ok(None);
        }
        let client = self.lifecycle.client()?;
        info!(links = urls.len(), "dispatching batch");
        Ok(Some(FetchDispatcher::new(client, &self.config)?))
    }
}

async fn with_deadline<T>(
    deadline: Duration,
    batch: impl Future<Output = Result<T, ServiceError>>,
) -> Result<T, ServiceError> {
    if let Ok(result) = tokio::time::timeout(deadline, batch).await {
        result
    } else {
        warn!(deadline_secs = deadline.as_secs(), "batch deadline elapsed");
        Err(ServiceError::Cancelled { deadline })
    }
}
