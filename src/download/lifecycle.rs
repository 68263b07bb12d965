//! Explicit start/stop ownership of the shared HTTP client.
//!
//! The client is built once at startup and released at shutdown. Callers
//! borrow clones of it in between; asking for it outside that window is a
//! hard error rather than a silently constructed fallback client.

use std::sync::{PoisonError, RwLock};

use thiserror::Error;
use tracing::{debug, info};

use super::client::HttpClient;
use crate::config::FetchConfig;

/// Errors from the client lifecycle.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The client was requested before `start` or after `shutdown`.
    #[error("HTTP client is not initialized; call start() before issuing requests")]
    NotInitialized,

    /// The client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

/// Owner of the process-wide [`HttpClient`].
#[derive(Debug, Default)]
pub struct ClientLifecycle {
    slot: RwLock<Option<HttpClient>>,
}

impl ClientLifecycle {
    /// Creates a lifecycle with no client running.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the client from `config`, replacing any running one.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Build`] if the client cannot be built; the
    /// previous state is left untouched in that case.
    pub fn start(&self, config: &FetchConfig) -> Result<(), LifecycleError> {
        let client = HttpClient::new(config).map_err(LifecycleError::Build)?;
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if slot.replace(client).is_some() {
            debug!("replaced running HTTP client");
        }
        info!("HTTP client started");
        Ok(())
    }

    /// Releases the client. In-flight requests holding a clone finish
    /// normally; new requests fail with [`LifecycleError::NotInitialized`].
    pub fn shutdown(&self) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if slot.take().is_some() {
            info!("HTTP client closed");
        }
    }

    /// Returns true between `start` and `shutdown`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Returns a handle to the running client.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotInitialized`] when no client is running.
    pub fn client(&self) -> Result<HttpClient, LifecycleError> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(LifecycleError::NotInitialized)
    }
}
