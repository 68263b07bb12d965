//! PDF Link Fetcher Library
//!
//! This library checks and downloads the PDF links carried by document
//! records. Records go in, one status record per unique link comes out.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`parser`] - Input payload model and link extraction
//! - [`resolver`] - Viewer URL resolution to the direct resource URL
//! - [`download`] - Shared HTTP client, filename generation, and the fetch dispatcher
//! - [`config`] - Runtime settings (timeouts, concurrency, output directory)
//! - [`service`] - Facade tying extraction and dispatch to the client lifecycle

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod download;
pub mod parser;
pub mod resolver;
pub mod service;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use config::{
    ConfigError, DEFAULT_CHECK_TIMEOUT, DEFAULT_CONCURRENCY, DEFAULT_DOWNLOAD_TIMEOUT,
    DEFAULT_OUTPUT_DIR, FetchConfig,
};
pub use download::{
    CheckLinksResponse, CheckState, ClientLifecycle, DownloadLinksResponse, DownloadState,
    DownloadStatus, FailureKind, FetchDispatcher, FetchError, HttpClient, LinkStatus,
    generate_filename,
};
pub use parser::{CandidateUrl, InputPayload, InputRecord, LinkRecord, extract_links};
pub use resolver::{VIEWER_MARKER, is_viewer_url, resolve_url};
pub use service::{PdfLinkService, ServiceError};
