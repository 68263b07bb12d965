//! Error types for per-link fetch operations.
//!
//! Every probe or download of a single link ends in `Ok` or one
//! [`FetchError`]. Errors never cross link boundaries: the dispatcher turns
//! each one into a status record for that link alone.

use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of a [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// DNS, TLS, connect, redirect, or timeout failure; no HTTP status.
    Transport,
    /// The server answered with a non-success status.
    HttpStatus,
    /// Writing the destination file failed.
    Filesystem,
    /// Anything else.
    Unexpected,
}

/// Errors that can occur while probing or downloading one link.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, TLS, redirect loop).
    #[error("network error fetching {url}: {category}")]
    Transport {
        /// The URL that was requested.
        url: String,
        /// Short category name, e.g. `ConnectError`.
        category: &'static str,
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned the status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error while creating or writing the destination file.
    #[error("IO error writing to {path}: {source}")]
    Filesystem {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The URL could not be parsed into a request.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// Catch-all for failures outside the categories above.
    #[error("unexpected failure fetching {url}: {message}")]
    Unexpected {
        /// The URL being processed.
        url: String,
        /// Human-readable description.
        message: String,
    },
}

impl FetchError {
    /// Creates a transport error from a client error, picking the timeout
    /// variant when the client reports one.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            return Self::Timeout { url };
        }
        let category = transport_category(&source);
        Self::Transport {
            url,
            category,
            source,
        }
    }

    /// Creates a transport error for a failure while reading a response body.
    ///
    /// The client reports every body-stream failure as a decode error, even a
    /// connection dropped mid-body. Only corrupt encoded data (an
    /// `InvalidData` I/O error somewhere in the source chain) is classified as
    /// `DecodingError`; everything else is a `ReadError`.
    pub fn body_read(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            return Self::Timeout { url };
        }
        let category = if has_invalid_data(&source) {
            "DecodingError"
        } else {
            "ReadError"
        };
        Self::Transport {
            url,
            category,
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a filesystem error.
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an unexpected-failure error.
    pub fn unexpected(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unexpected {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Returns the tagged outcome category for this error.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport { .. } | Self::Timeout { .. } => FailureKind::Transport,
            Self::HttpStatus { .. } => FailureKind::HttpStatus,
            Self::Filesystem { .. } => FailureKind::Filesystem,
            Self::InvalidUrl { .. } | Self::Unexpected { .. } => FailureKind::Unexpected,
        }
    }

    /// The HTTP status code, for [`FailureKind::HttpStatus`] errors.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short name of the transport failure, for [`FailureKind::Transport`] errors.
    #[must_use]
    pub fn transport_category(&self) -> Option<&'static str> {
        match self {
            Self::Transport { category, .. } => Some(*category),
            Self::Timeout { .. } => Some("Timeout"),
            _ => None,
        }
    }

    /// Human-readable detail without the URL, for unexpected and filesystem errors.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Filesystem { source, .. } => source.to_string(),
            Self::Unexpected { message, .. } => message.clone(),
            Self::InvalidUrl { url } => format!("invalid URL '{url}'"),
            other => other.to_string(),
        }
    }
}

// Note: no `From<reqwest::Error>` / `From<std::io::Error>` impls. Every
// variant needs the URL or path, which the source errors don't carry.

fn transport_category(error: &reqwest::Error) -> &'static str {
    if error.is_connect() {
        "ConnectError"
    } else if error.is_redirect() {
        "TooManyRedirects"
    } else if error.is_body() {
        "ReadError"
    } else if error.is_decode() {
        "DecodingError"
    } else if error.is_request() {
        "RequestError"
    } else {
        "TransportError"
    }
}

fn has_invalid_data(error: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(err) = current {
        if err
            .downcast_ref::<std::io::Error>()
            .is_some_and(|io| io.kind() == std::io::ErrorKind::InvalidData)
        {
            return true;
        }
        current = err.source();
    }
    false
}
