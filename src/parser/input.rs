//! Types representing the request payload and the document records in it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key carrying a list of PDF links.
const LINKS_KEY: &str = "pdf_links";
const LINKS_KEY_CAMEL: &str = "pdfLinks";

/// Legacy key carrying a single PDF link.
const LINK_KEY: &str = "pdf_link";
const LINK_KEY_CAMEL: &str = "pdfLink";

/// A structured document record with zero or more PDF links.
///
/// Metadata fields are carried through for callers but never inspected by the
/// link pipeline; only `pdf_links` matters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Page the record was scraped from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breadcrumbs_japanese: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breadcrumbs_english: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_japanese: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_english: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher_japanese: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher_english: Option<String>,
    /// Raw link strings, unvalidated.
    #[serde(alias = "pdfLinks")]
    pub pdf_links: Vec<String>,
}

impl LinkRecord {
    /// Creates a record carrying only links.
    #[must_use]
    pub fn with_links<I, S>(links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pdf_links: links.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// One input record: either a structured [`LinkRecord`] or a loosely-typed map.
///
/// Maps are accepted for backward compatibility with callers that send a
/// single `pdf_link` field, or a `pdf_links` array holding non-string entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputRecord {
    Structured(LinkRecord),
    Loose(Map<String, Value>),
}

impl InputRecord {
    /// Returns every raw string this record offers as a link candidate.
    ///
    /// For loose maps the `pdf_links` array wins; the single `pdf_link` field
    /// is only consulted when no such array is present. Non-string values are
    /// skipped.
    pub(crate) fn raw_links(&self) -> Vec<&str> {
        match self {
            Self::Structured(record) => record.pdf_links.iter().map(String::as_str).collect(),
            Self::Loose(map) => {
                let list = map
                    .get(LINKS_KEY)
                    .or_else(|| map.get(LINKS_KEY_CAMEL))
                    .and_then(Value::as_array);
                if let Some(list) = list {
                    return list.iter().filter_map(Value::as_str).collect();
                }
                map.get(LINK_KEY)
                    .or_else(|| map.get(LINK_KEY_CAMEL))
                    .and_then(Value::as_str)
                    .into_iter()
                    .collect()
            }
        }
    }
}

impl From<LinkRecord> for InputRecord {
    fn from(record: LinkRecord) -> Self {
        Self::Structured(record)
    }
}

/// The request body shapes accepted by the check and download operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputPayload {
    /// `{"data": [record, ...]}`
    Wrapped { data: Vec<InputRecord> },
    /// `[record, ...]`
    Many(Vec<InputRecord>),
    /// `record`
    Single(InputRecord),
}

impl InputPayload {
    /// Normalizes any accepted shape into a flat list of records.
    #[must_use]
    pub fn into_records(self) -> Vec<InputRecord> {
        match self {
            Self::Wrapped { data } | Self::Many(data) => data,
            Self::Single(record) => vec![record],
        }
    }
}
