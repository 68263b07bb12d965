//! Filename generation for downloaded links.
//!
//! Names are derived from the last path segment of the resolved URL, forced
//! to a `.pdf` extension and sanitized for single-segment filesystem use.
//! When the URL has no usable segment, a digest of the original URL stands in.

use std::path::{Component, Path};

use sha2::{Digest, Sha256};
use tracing::debug;
use url::Url;

use crate::resolver::resolve_url;

/// Extension every generated name ends with.
const PDF_EXTENSION: &str = ".pdf";

/// Number of hex digits of the SHA-256 digest kept in fallback names.
const HASH_HEX_LEN: usize = 32;

/// Generates the local filename for `url`.
///
/// The URL is resolved first, so a viewer link is named after the document it
/// points to. The result always ends in `.pdf`, never contains `/`, `\`, or
/// `:`, and is the same for the same input across runs and processes.
///
/// Distinct URLs that share a final path segment map to the same name.
///
/// # Example
///
/// ```
/// use pdf_link_fetcher::download::generate_filename;
///
/// assert_eq!(generate_filename("https://example.com/docs/report"), "report.pdf");
/// assert!(generate_filename("https://example.com/").starts_with("downloaded_"));
/// ```
#[must_use]
pub fn generate_filename(url: &str) -> String {
    match filename_from_path(url) {
        Some(name) => name,
        None => {
            debug!(url = %url, "no usable path segment, using digest filename");
            hashed_filename(url)
        }
    }
}

fn filename_from_path(url: &str) -> Option<String> {
    let resolved = resolve_url(url);
    let parsed = Url::parse(&resolved).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    if last.is_empty() {
        return None;
    }

    let decoded = urlencoding::decode(last).map_or_else(|_| last.to_string(), |d| d.into_owned());
    let mut name = sanitize_filename(&decoded);
    if !name.to_lowercase().ends_with(PDF_EXTENSION) {
        name.push_str(PDF_EXTENSION);
    }
    Some(name)
}

/// `downloaded_<digest>.pdf`, keyed on the original, unresolved URL.
pub(crate) fn hashed_filename(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let hex: String = digest.iter().map(|byte| format!("{byte:02x}")).collect();
    format!("downloaded_{}{PDF_EXTENSION}", &hex[..HASH_HEX_LEN])
}

/// Sanitizes filename for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems:
/// / \ : * ? " < > |
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
