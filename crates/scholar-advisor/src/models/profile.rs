//! Normalized profile record handed to the prompt stage.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A bibliometric count that the source may or may not report.
///
/// `Unknown` means the source omitted the value and never equals `Reported(0)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<u64>", into = "Option<u64>")]
pub enum Metric {
    /// Value reported by the source.
    Reported(u64),
    /// Source omitted the value.
    #[default]
    Unknown,
}

impl Metric {
    /// Build from a raw upstream count. Negative counts are treated as unreported.
    #[must_use]
    pub fn from_count(raw: Option<i64>) -> Self {
        raw.and_then(|n| u64::try_from(n).ok()).map_or(Self::Unknown, Self::Reported)
    }

    /// The reported value, if any.
    #[must_use]
    pub const fn value(self) -> Option<u64> {
        match self {
            Self::Reported(n) => Some(n),
            Self::Unknown => None,
        }
    }

    #[must_use]
    pub const fn is_known(self) -> bool {
        matches!(self, Self::Reported(_))
    }
}

impl From<Option<u64>> for Metric {
    fn from(value: Option<u64>) -> Self {
        value.map_or(Self::Unknown, Self::Reported)
    }
}

impl From<Metric> for Option<u64> {
    fn from(metric: Metric) -> Self {
        metric.value()
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reported(n) => write!(f, "{n}"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// A non-empty publication title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicationTitle(String);

impl PublicationTitle {
    /// Trim and wrap a title; blank titles are rejected.
    #[must_use]
    pub fn new(title: &str) -> Option<Self> {
        let trimmed = title.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PublicationTitle {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).ok_or("publication title must not be empty")
    }
}

impl From<PublicationTitle> for String {
    fn from(title: PublicationTitle) -> Self {
        title.0
    }
}

impl fmt::Display for PublicationTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display name used when the source reports none.
pub const UNKNOWN_AUTHOR: &str = "Unknown author";

/// Full profile of one academic, as returned by a successful fetch.
///
/// Built once through [`ProfileRecord::new`] and the `with_*` methods, then
/// only read. There are no setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    display_name: String,
    affiliation: Option<String>,
    citation_count: Metric,
    h_index: Metric,
    i10_index: Metric,
    citations_by_year: Option<BTreeMap<i32, u64>>,
    research_interests: Vec<String>,
    publications: Vec<PublicationTitle>,
}

impl ProfileRecord {
    /// Start a record. Returns `None` when the display name is blank.
    #[must_use]
    pub fn new(display_name: &str) -> Option<Self> {
        let name = display_name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self::named(name))
    }

    /// Start a record, substituting a placeholder for a blank name.
    #[must_use]
    pub fn new_or_placeholder(display_name: &str) -> Self {
        Self::new(display_name).unwrap_or_else(|| Self::named(UNKNOWN_AUTHOR))
    }

    fn named(name: &str) -> Self {
        Self {
            display_name: name.to_string(),
            affiliation: None,
            citation_count: Metric::Unknown,
            h_index: Metric::Unknown,
            i10_index: Metric::Unknown,
            citations_by_year: None,
            research_interests: Vec::new(),
            publications: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_affiliation(mut self, affiliation: Option<String>) -> Self {
        self.affiliation = affiliation.map(|a| a.trim().to_string()).filter(|a| !a.is_empty());
        self
    }

    #[must_use]
    pub fn with_citation_count(mut self, count: Metric) -> Self {
        self.citation_count = count;
        self
    }

    #[must_use]
    pub fn with_h_index(mut self, h_index: Metric) -> Self {
        self.h_index = h_index;
        self
    }

    #[must_use]
    pub fn with_i10_index(mut self, i10_index: Metric) -> Self {
        self.i10_index = i10_index;
        self
    }

    #[must_use]
    pub fn with_citations_by_year(mut self, by_year: Option<BTreeMap<i32, u64>>) -> Self {
        self.citations_by_year = by_year;
        self
    }

    #[must_use]
    pub fn with_research_interests(mut self, interests: Vec<String>) -> Self {
        self.research_interests = interests
            .into_iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect();
        self
    }

    /// Attach publications in source order, dropping blank titles.
    #[must_use]
    pub fn with_publications<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.publications =
            titles.into_iter().filter_map(|t| PublicationTitle::new(t.as_ref())).collect();
        self
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn affiliation(&self) -> Option<&str> {
        self.affiliation.as_deref()
    }

    #[must_use]
    pub const fn citation_count(&self) -> Metric {
        self.citation_count
    }

    #[must_use]
    pub const fn h_index(&self) -> Metric {
        self.h_index
    }

    #[must_use]
    pub const fn i10_index(&self) -> Metric {
        self.i10_index
    }

    #[must_use]
    pub const fn citations_by_year(&self) -> Option<&BTreeMap<i32, u64>> {
        self.citations_by_year.as_ref()
    }

    #[must_use]
    pub fn research_interests(&self) -> &[String] {
        &self.research_interests
    }

    #[must_use]
    pub fn publications(&self) -> &[PublicationTitle] {
        &self.publications
    }

    /// The first `n` publications, in source order.
    #[must_use]
    pub fn top_publications(&self, n: usize) -> &[PublicationTitle] {
        &self.publications[..n.min(self.publications.len())]
    }
}
