//! Viewer URL resolution.
//!
//! Some document sites link to an HTML viewer page rather than the PDF
//! itself, e.g. `https://host/pdfjs/web/viewer.html?file=/docs/a.pdf`. The
//! real resource path is embedded in the `file` query parameter. This module
//! rewrites such links to the direct resource URL so probes and downloads
//! never hit the viewer page.
//!
//! Resolution never fails: anything that cannot be parsed passes through
//! unchanged.
//!
//! # Example
//!
//! ```
//! use pdf_link_fetcher::resolver::resolve_url;
//!
//! assert_eq!(
//!     resolve_url("https://host/viewer.html?file=/docs/a.pdf"),
//!     "https://host/docs/a.pdf"
//! );
//! assert_eq!(resolve_url("https://host/a.pdf"), "https://host/a.pdf");
//! ```

use tracing::debug;
use url::Url;

/// Path fragment identifying a viewer page.
pub const VIEWER_MARKER: &str = "viewer.html";

/// Query fragment that must be present for a viewer URL to be rewritten.
const FILE_QUERY_FRAGMENT: &str = "file=";

/// Query parameter carrying the embedded resource path.
const FILE_PARAM: &str = "file";

/// Returns true if `url` is a viewer indirection URL.
///
/// The path must contain [`VIEWER_MARKER`] and the full string must contain
/// `file=`. Unparseable input is never a viewer URL.
#[must_use]
pub fn is_viewer_url(url: &str) -> bool {
    Url::parse(url).is_ok_and(|parsed| is_viewer(&parsed, url))
}

fn is_viewer(parsed: &Url, raw: &str) -> bool {
    parsed.path().contains(VIEWER_MARKER) && raw.contains(FILE_QUERY_FRAGMENT)
}

/// Resolves `url` to the URL that should actually be fetched.
///
/// Viewer URLs are rewritten to their embedded resource; every other input,
/// including anything that fails to parse, is returned unchanged.
#[must_use]
pub fn resolve_url(url: &str) -> String {
    match resolve_viewer(url) {
        Some(resolved) => {
            debug!(url = %url, resolved = %resolved, "resolved viewer URL");
            resolved
        }
        None => url.to_string(),
    }
}

/// Returns the direct resource URL for a viewer URL, or `None` when `url`
/// is not a viewer URL or its embedded path is unusable.
fn resolve_viewer(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    if !is_viewer(&parsed, url) {
        return None;
    }

    let embedded = parsed
        .query_pairs()
        .find(|(key, value)| key == FILE_PARAM && !value.is_empty())
        .map(|(_, value)| value.into_owned())?;

    // An embedded absolute URL is already direct.
    let lowered = embedded.to_lowercase();
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        return Some(embedded);
    }

    let origin = origin_of(&parsed)?;
    if embedded.starts_with('/') {
        return Some(format!("{origin}{embedded}"));
    }

    // Relative: replace the viewer page segment with the embedded path.
    let directory = parsed
        .path()
        .rsplit_once('/')
        .map_or("", |(directory, _)| directory);
    Some(format!("{origin}{directory}/{embedded}"))
}

/// `scheme://host[:port]` for `url`.
fn origin_of(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_absolute_embedded_path() {
        assert_eq!(
            resolve_url("https://host/viewer.html?file=/docs/a.pdf"),
            "https://host/docs/a.pdf"
        );
    }

    #[test]
    fn test_resolve_relative_embedded_path() {
        assert_eq!(
            resolve_url("https://host/sub/viewer.html?file=a.pdf"),
            "https://host/sub/a.pdf"
        );
    }

    #[test]
    fn test_resolve_relative_keeps_intermediate_segments() {
        assert_eq!(
            resolve_url("https://host/a/b/web/viewer.html?file=files/x.pdf"),
            "https://host/a/b/web/files/x.pdf"
        );
    }

    #[test]
    fn test_resolve_relative_at_root() {
        assert_eq!(
            resolve_url("https://host/viewer.html?file=a.pdf"),
            "https://host/a.pdf"
        );
    }

    #[test]
    fn test_resolve_keeps_port() {
        assert_eq!(
            resolve_url("http://127.0.0.1:8080/pdfjs/web/viewer.html?file=/docs/a.pdf"),
            "http://127.0.0.1:8080/docs/a.pdf"
        );
    }

    #[test]
    fn test_resolve_decodes_percent_encoded_file_param() {
        assert_eq!(
            resolve_url("https://host/viewer.html?file=%2Fdocs%2Fmy%20file.pdf"),
            "https://host/docs/my file.pdf"
        );
    }

    #[test]
    fn test_resolve_uses_first_file_value() {
        assert_eq!(
            resolve_url("https://host/viewer.html?file=/one.pdf&file=/two.pdf"),
            "https://host/one.pdf"
        );
    }

    #[test]
    fn test_resolve_skips_empty_file_values() {
        assert_eq!(
            resolve_url("https://host/viewer.html?file=&file=/a.pdf"),
            "https://host/a.pdf"
        );
    }

    #[test]
    fn test_resolve_embedded_absolute_url() {
        assert_eq!(
            resolve_url("https://host/viewer.html?file=https://cdn.example.com/a.pdf"),
            "https://cdn.example.com/a.pdf"
        );
    }

    #[test]
    fn test_non_viewer_passes_through_unchanged() {
        let url = "https://host/docs/a.pdf?file=/other.pdf";
        assert_eq!(resolve_url(url), url);
        let url = "https://host/viewer.html?page=2";
        assert_eq!(resolve_url(url), url);
    }

    #[test]
    fn test_resolve_is_idempotent_for_non_viewer_urls() {
        for url in [
            "https://host/a.pdf",
            "HTTP://Host/Path/Doc.PDF",
            "https://host/",
            "not a url",
        ] {
            let once = resolve_url(url);
            assert_eq!(once, url);
            assert_eq!(resolve_url(&once), once);
        }
    }

    #[test]
    fn test_unparseable_input_falls_back_to_original() {
        assert_eq!(resolve_url("http://"), "http://");
        assert_eq!(
            resolve_url("http://[bad/viewer.html?file=a.pdf"),
            "http://[bad/viewer.html?file=a.pdf"
        );
    }

    #[test]
    fn test_viewer_without_file_value_falls_back() {
        let url = "https://host/viewer.html?xfile=a.pdf";
        assert!(is_viewer_url(url));
        assert_eq!(resolve_url(url), url);
        let url = "https://host/viewer.html?file=";
        assert_eq!(resolve_url(url), url);
    }

    #[test]
    fn test_is_viewer_url_requires_marker_and_file_fragment() {
        assert!(is_viewer_url("https://host/web/viewer.html?file=a.pdf"));
        assert!(!is_viewer_url("https://host/web/index.html?file=a.pdf"));
        assert!(!is_viewer_url("https://host/web/viewer.html"));
        assert!(!is_viewer_url("https://host/?q=viewer.html&file=a.pdf"));
    }
}
