//! Per-link status records and the mapping from fetch errors to them.
//!
//! Each record is built once per unique input link and never changed. The
//! constructors enforce the shared taxonomy: an error message is present on
//! every failure and absent on every success.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{FailureKind, FetchError};

/// Outcome of a liveness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckState {
    Ok,
    Failed,
}

/// Outcome of a download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DownloadState {
    Downloaded,
    /// The resource was unreachable or answered with an error status.
    FailedCheck,
    /// The resource was reachable but could not be saved.
    FailedDownload,
}

/// Result of checking one link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStatus {
    url: String,
    status: CheckState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
}

impl LinkStatus {
    /// A reachable link.
    #[must_use]
    pub fn ok(url: impl Into<String>, status_code: u16) -> Self {
        Self {
            url: url.into(),
            status: CheckState::Ok,
            status_code: Some(status_code),
            error_message: None,
        }
    }

    /// A link whose probe completed with a status other than 200.
    #[must_use]
    pub fn unexpected_status(url: impl Into<String>, status_code: u16) -> Self {
        Self {
            url: url.into(),
            status: CheckState::Failed,
            status_code: Some(status_code),
            error_message: Some(format!("HTTP status code: {status_code}")),
        }
    }

    /// A link whose probe failed with `error`.
    #[must_use]
    pub fn from_error(url: impl Into<String>, error: &FetchError) -> Self {
        let url = url.into();
        match error.kind() {
            FailureKind::HttpStatus => match error.status_code() {
                Some(code) => Self::unexpected_status(url, code),
                None => Self::failed(url, format!("Unexpected error: {}", error.detail())),
            },
            FailureKind::Transport => Self::failed(
                url,
                format!(
                    "Request error: {}",
                    error.transport_category().unwrap_or("TransportError")
                ),
            ),
            FailureKind::Filesystem | FailureKind::Unexpected => {
                Self::failed(url, format!("Unexpected error: {}", error.detail()))
            }
        }
    }

    fn failed(url: String, message: String) -> Self {
        Self {
            url,
            status: CheckState::Failed,
            status_code: None,
            error_message: Some(message),
        }
    }

    /// The link as the caller supplied it.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn status(&self) -> CheckState {
        self.status
    }

    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == CheckState::Ok
    }
}

/// Result of downloading one link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadStatus {
    url: String,
    status: DownloadState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
}

impl DownloadStatus {
    /// A link saved to `path`.
    #[must_use]
    pub fn downloaded(url: impl Into<String>, path: &Path) -> Self {
        Self {
            url: url.into(),
            status: DownloadState::Downloaded,
            file_path: Some(path.display().to_string()),
            error_message: None,
        }
    }

    /// A link whose download failed with `error`.
    #[must_use]
    pub fn from_error(url: impl Into<String>, error: &FetchError) -> Self {
        let (status, message) = match error.kind() {
            FailureKind::HttpStatus => (
                DownloadState::FailedCheck,
                match error.status_code() {
                    Some(code) => format!("HTTP error: {code}"),
                    None => format!("HTTP error: {}", error.detail()),
                },
            ),
            FailureKind::Transport => (
                DownloadState::FailedCheck,
                format!(
                    "Request error: {}",
                    error.transport_category().unwrap_or("TransportError")
                ),
            ),
            FailureKind::Filesystem => (
                DownloadState::FailedDownload,
                format!("File writing error: {}", error.detail()),
            ),
            FailureKind::Unexpected => (
                DownloadState::FailedDownload,
                format!("Unexpected download error: {}", error.detail()),
            ),
        };
        Self {
            url: url.into(),
            status,
            file_path: None,
            error_message: Some(message),
        }
    }

    /// The link as the caller supplied it.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn status(&self) -> DownloadState {
        self.status
    }

    #[must_use]
    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    #[must_use]
    pub fn is_downloaded(&self) -> bool {
        self.status == DownloadState::Downloaded
    }
}

/// Response body for a batch of link checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckLinksResponse {
    pub results: Vec<LinkStatus>,
}

/// Response body for a batch of downloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadLinksResponse {
    pub results: Vec<DownloadStatus>,
}
