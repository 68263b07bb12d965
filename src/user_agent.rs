//! Shared User-Agent string for probe and download requests.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/pdf-link-fetcher";

/// Default User-Agent for HEAD probes and streamed downloads.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("pdf-link-fetcher/{version} (+{PROJECT_UA_URL})")
}
