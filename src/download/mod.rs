//! Link probing and streamed downloads.
//!
//! This module owns everything that touches the network or the output
//! directory: the shared HTTP client and its lifecycle, the concurrent fetch
//! dispatcher, filename generation, and the per-link status records.
//!
//! # Features
//!
//! - HEAD liveness probes against resolved URLs
//! - Streaming downloads (memory-efficient for large files)
//! - Bounded concurrency with one task per unique link
//! - Deterministic, filesystem-safe filenames
//! - Partial files removed when a transfer fails
//!
//! # Example
//!
//! ```no_run
//! use pdf_link_fetcher::download::HttpClient;
//! use pdf_link_fetcher::FetchConfig;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new(&FetchConfig::default())?;
//! let bytes = client
//!     .download_to_path("https://example.com/paper.pdf", Path::new("./paper.pdf"))
//!     .await?;
//! println!("Downloaded {bytes} bytes");
//! # Ok(())
//! # }
//! ```

mod client;
mod dispatcher;
mod error;
mod filename;
mod lifecycle;
mod status;

pub use client::HttpClient;
pub use dispatcher::FetchDispatcher;
pub use error::{FailureKind, FetchError};
pub use filename::generate_filename;
pub use lifecycle::{ClientLifecycle, LifecycleError};
pub use status::{
    CheckLinksResponse, CheckState, DownloadLinksResponse, DownloadState, DownloadStatus,
    LinkStatus,
};

// Note: no module-local Result aliases.
// Use `Result<T, FetchError>` explicitly in function signatures.
