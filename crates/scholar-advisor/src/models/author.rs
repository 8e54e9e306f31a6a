//! Author data model matching the profile source API schema.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Metric, ProfileRecord};

/// A lightweight, unenriched reference to a matching profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Source identifier of the author.
    pub author_id: String,

    /// Author name.
    #[serde(default)]
    pub name: Option<String>,

    /// Institutional affiliations.
    #[serde(default)]
    pub affiliations: Vec<String>,
}

impl Candidate {
    /// Create a candidate with just an identifier.
    #[must_use]
    pub fn new(author_id: impl Into<String>) -> Self {
        Self { author_id: author_id.into(), name: None, affiliations: Vec::new() }
    }

    /// Get the author name, falling back to the identifier.
    #[must_use]
    pub fn name_or_id(&self) -> &str {
        self.name.as_deref().filter(|n| !n.trim().is_empty()).unwrap_or(&self.author_id)
    }
}

/// One page of an author name search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorSearchResult {
    /// Total matching authors.
    #[serde(default)]
    pub total: i64,

    /// Offset for pagination.
    #[serde(default)]
    pub offset: i32,

    /// Next offset if more results.
    #[serde(default)]
    pub next: Option<i32>,

    /// Candidates on this page, in relevance order.
    #[serde(default)]
    pub data: Vec<Candidate>,
}

/// Full author details from the profile endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorDetail {
    /// Source identifier of the author.
    pub author_id: String,

    /// Author name.
    #[serde(default)]
    pub name: Option<String>,

    /// Institutional affiliations.
    #[serde(default)]
    pub affiliations: Vec<String>,

    /// Total number of papers by this author.
    #[serde(default)]
    pub paper_count: Option<i64>,

    /// Total citation count across all papers.
    #[serde(default)]
    pub citation_count: Option<i64>,

    /// h-index metric.
    #[serde(default)]
    pub h_index: Option<i64>,

    /// i10-index, when the source reports it.
    ///
    /// Never requested; see [`fields::PROFILE`](crate::config::fields::PROFILE).
    #[serde(default)]
    pub i10_index: Option<i64>,

    /// Citations per calendar year, when the source reports them.
    #[serde(default)]
    pub citations_per_year: Option<BTreeMap<i32, i64>>,

    /// Research interests, when the source reports them.
    #[serde(default)]
    pub interests: Vec<String>,
}

/// Minimal publication entry from the author papers endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperSummary {
    /// Paper title.
    #[serde(default)]
    pub title: Option<String>,

    /// Publication year.
    #[serde(default)]
    pub year: Option<i32>,

    /// Citations received.
    #[serde(default)]
    pub citation_count: Option<i64>,
}

/// Author papers result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorPapersResult {
    /// Offset for pagination.
    #[serde(default)]
    pub offset: i32,

    /// Next offset if more results.
    #[serde(default)]
    pub next: Option<i32>,

    /// List of papers.
    #[serde(default)]
    pub data: Vec<PaperSummary>,
}

impl AuthorDetail {
    /// Assemble the normalized record from author details and their publications.
    ///
    /// `fallback_name` is used when the detail response carries no usable name.
    /// The i10-index is derived from `papers` only when the source omits it and the
    /// list is complete (every paper fetched, every paper with a count).
    #[must_use]
    pub fn into_record(self, fallback_name: &str, papers: &[PaperSummary]) -> ProfileRecord {
        let i10 = match self.i10_index {
            Some(_) => Metric::from_count(self.i10_index),
            None => derive_i10(self.paper_count, papers),
        };

        let by_year = self.citations_per_year.map(|years| {
            years
                .into_iter()
                .filter_map(|(year, n)| u64::try_from(n).ok().map(|n| (year, n)))
                .collect::<BTreeMap<_, _>>()
        });

        let name = self.name.as_deref().filter(|n| !n.trim().is_empty()).unwrap_or(fallback_name);
        let record = ProfileRecord::new(name)
            .unwrap_or_else(|| ProfileRecord::new_or_placeholder(&self.author_id));

        record
            .with_affiliation(self.affiliations.into_iter().next())
            .with_citation_count(Metric::from_count(self.citation_count))
            .with_h_index(Metric::from_count(self.h_index))
            .with_i10_index(i10)
            .with_citations_by_year(by_year)
            .with_research_interests(self.interests)
            .with_publications(papers.iter().filter_map(|p| p.title.as_deref()))
    }
}

fn derive_i10(paper_count: Option<i64>, papers: &[PaperSummary]) -> Metric {
    let complete = paper_count.is_some_and(|n| usize::try_from(n).ok() == Some(papers.len()));
    if !complete || papers.is_empty() {
        return Metric::Unknown;
    }
    let counts: Option<Vec<i64>> = papers.iter().map(|p| p.citation_count).collect();
    counts.map_or(Metric::Unknown, |counts| {
        Metric::Reported(counts.iter().filter(|&&c| c >= 10).count() as u64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_detail_deserialize() {
        let json = r#"{
            "authorId": "123",
            "name": "Jane Smith",
            "affiliations": ["MIT", "Stanford"],
            "paperCount": 50,
            "citationCount": 1000,
            "hIndex": 15
        }"#;

        let author: AuthorDetail = serde_json::from_str(json).unwrap();
        let record = author.into_record("fallback", &[]);
        assert_eq!(record.display_name(), "Jane Smith");
        assert_eq!(record.affiliation(), Some("MIT"));
        assert_eq!(record.h_index(), Metric::Reported(15));
        assert_eq!(record.citation_count(), Metric::Reported(1000));
        assert_eq!(record.i10_index(), Metric::Unknown);
    }

    #[test]
    fn test_minimal_author_uses_fallback_name() {
        let author: AuthorDetail = serde_json::from_str(r#"{"authorId": "456"}"#).unwrap();
        let record = author.into_record("Searched Name", &[]);
        assert_eq!(record.display_name(), "Searched Name");
        assert_eq!(record.h_index(), Metric::Unknown);
        assert!(record.citations_by_year().is_none());
    }

    #[test]
    fn test_citations_per_year_keys_parse() {
        let json = r#"{"authorId": "1", "citationsPerYear": {"2021": 4, "2019": 2}}"#;
        let author: AuthorDetail = serde_json::from_str(json).unwrap();
        let record = author.into_record("x", &[]);
        let years: Vec<i32> = record.citations_by_year().unwrap().keys().copied().collect();
        assert_eq!(years, vec![2019, 2021]);
    }

    #[test]
    fn test_i10_derived_only_from_complete_list() {
        let papers = vec![
            PaperSummary { title: Some("a".into()), citation_count: Some(12), ..Default::default() },
            PaperSummary { title: Some("b".into()), citation_count: Some(3), ..Default::default() },
        ];

        let complete = AuthorDetail { paper_count: Some(2), ..Default::default() };
        assert_eq!(complete.into_record("n", &papers).i10_index(), Metric::Reported(1));

        let partial = AuthorDetail { paper_count: Some(40), ..Default::default() };
        assert_eq!(partial.into_record("n", &papers).i10_index(), Metric::Unknown);

        let reported = AuthorDetail { paper_count: Some(2), i10_index: Some(9), ..Default::default() };
        assert_eq!(reported.into_record("n", &papers).i10_index(), Metric::Reported(9));
    }

    #[test]
    fn test_graph_shaped_detail_leaves_extras_unknown() {
        let json = r#"{
            "authorId": "A1",
            "name": "Siti Rahma",
            "affiliations": [],
            "paperCount": 40,
            "citationCount": 120,
            "hIndex": 5
        }"#;
        let papers =
            vec![PaperSummary { title: Some("a".into()), citation_count: Some(50), ..Default::default() }];

        let author: AuthorDetail = serde_json::from_str(json).unwrap();
        let record = author.into_record("x", &papers);
        assert_eq!(record.h_index(), Metric::Reported(5));
        assert_eq!(record.i10_index(), Metric::Unknown);
        assert!(record.citations_by_year().is_none());
        assert!(record.research_interests().is_empty());
        assert_eq!(record.affiliation(), None);
    }

    #[test]
    fn test_candidate_name_or_id() {
        let c: Candidate = serde_json::from_str(r#"{"authorId": "9"}"#).unwrap();
        assert_eq!(c.name_or_id(), "9");
        let c: Candidate = serde_json::from_str(r#"{"authorId": "9", "name": "Ann Lee"}"#).unwrap();
        assert_eq!(c.name_or_id(), "Ann Lee");
    }
}
