//! Candidate URL validation.

use std::fmt;

/// Accepted scheme prefixes, compared against the lowercased input.
const ACCEPTED_PREFIXES: [&str; 2] = ["http://", "https://"];

/// A link string eligible for fetching.
///
/// Invariant: non-empty and starts with `http://` or `https://` ignoring case.
/// The original string, casing included, is kept verbatim so results can be
/// correlated with the caller's input.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CandidateUrl(String);

impl CandidateUrl {
    /// Accepts `raw` if it satisfies the http(s) prefix predicate.
    ///
    /// Returns `None` for anything else; rejection is not an error.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        let lowered = raw.to_lowercase();
        ACCEPTED_PREFIXES
            .iter()
            .any(|prefix| lowered.starts_with(prefix))
            .then(|| Self(raw.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CandidateUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
