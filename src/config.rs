//! Runtime settings for link checks and downloads.
//!
//! [`FetchConfig`] carries everything the dispatcher needs: where files land,
//! how long a single request may take, and how many requests may be in flight.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Default output directory for downloaded files.
pub const DEFAULT_OUTPUT_DIR: &str = "/app/downloads";

/// Default timeout for HEAD probes (15 seconds).
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(15);

/// Default timeout for streamed GET downloads (60 seconds).
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Default maximum number of in-flight requests per batch.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Default maximum number of redirects followed per request.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Minimum allowed concurrency value.
const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
const MAX_CONCURRENCY: usize = 100;

/// Upper bound for any configured timeout (1 hour).
const MAX_TIMEOUT: Duration = Duration::from_secs(3600);

/// Errors raised by [`FetchConfig::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Concurrency outside the supported range.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The rejected value.
        value: usize,
    },

    /// A timeout that is zero or longer than an hour.
    #[error("invalid {field}: {secs}s (expected 1..=3600 seconds)")]
    InvalidTimeout {
        /// Name of the offending setting.
        field: &'static str,
        /// The rejected value in whole seconds.
        secs: u64,
    },
}

/// Settings consumed by the HTTP client and the fetch dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    output_dir: PathBuf,
    check_timeout: Duration,
    download_timeout: Duration,
    connect_timeout: Duration,
    concurrency: usize,
    follow_redirects: bool,
    max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            check_timeout: DEFAULT_CHECK_TIMEOUT,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            connect_timeout: DEFAULT_CHECK_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
            follow_redirects: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl FetchConfig {
    /// Creates a config with all defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory downloaded files are written to.
    #[must_use]
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Sets the per-request timeout used for HEAD probes.
    #[must_use]
    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = timeout;
        self
    }

    /// Sets the per-request timeout used for streamed downloads.
    #[must_use]
    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    /// Sets the maximum number of requests in flight per batch.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Enables or disables redirect following.
    #[must_use]
    pub fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn check_timeout(&self) -> Duration {
        self.check_timeout
    }

    #[must_use]
    pub fn download_timeout(&self) -> Duration {
        self.download_timeout
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    #[must_use]
    pub fn follow_redirects(&self) -> bool {
        self.follow_redirects
    }

    #[must_use]
    pub fn max_redirects(&self) -> usize {
        self.max_redirects
    }

    /// Checks the settings against supported ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConcurrency`] when concurrency is outside
    /// 1..=100, and [`ConfigError::InvalidTimeout`] for a zero or over-long timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(ConfigError::InvalidConcurrency {
                value: self.concurrency,
            });
        }
        validate_timeout("check_timeout", self.check_timeout)?;
        validate_timeout("download_timeout", self.download_timeout)?;
        validate_timeout("connect_timeout", self.connect_timeout)?;
        Ok(())
    }
}

fn validate_timeout(field: &'static str, value: Duration) -> Result<(), ConfigError> {
    if value.is_zero() || value > MAX_TIMEOUT {
        return Err(ConfigError::InvalidTimeout {
            field,
            secs: value.as_secs(),
        });
    }
    Ok(())
}
