//! Input parsing module for document records and their PDF links.
//!
//! This module accepts the request payload shapes callers send (a wrapped
//! `data` array, a bare array, or a single record) and extracts the set of
//! unique HTTP/HTTPS links to check or download.
//!
//! # Example
//!
//! ```
//! use pdf_link_fetcher::parser::{InputPayload, extract_links};
//!
//! let payload: InputPayload = serde_json::from_str(
//!     r#"[{"pdf_links": ["https://example.com/a.pdf", "ftp://x/y.pdf"]}]"#,
//! ).unwrap();
//! let links = extract_links(&payload.into_records());
//! assert_eq!(links.len(), 1);
//! ```

mod input;
mod url;

pub use input::{InputPayload, InputRecord, LinkRecord};
pub use url::CandidateUrl;

use std::collections::BTreeSet;

use tracing::{debug, trace};

/// Extracts the unique candidate URLs carried by `records`.
///
/// Strings that are empty or do not start with `http://`/`https://`
/// (case-insensitive) are dropped silently. Uniqueness is by exact string
/// equality, so `https://a/x.pdf` and `HTTPS://a/x.pdf` are distinct entries.
#[tracing::instrument(skip(records), fields(records = records.len()))]
#[must_use]
pub fn extract_links(records: &[InputRecord]) -> BTreeSet<CandidateUrl> {
    let mut links = BTreeSet::new();
    let mut skipped = 0usize;

    for record in records {
        for raw in record.raw_links() {
            match CandidateUrl::parse(raw) {
                Some(candidate) => {
                    trace!(url = %candidate, "accepted link");
                    links.insert(candidate);
                }
                None => skipped += 1,
            }
        }
    }

    debug!(unique = links.len(), skipped, "extracted links");
    links
}
