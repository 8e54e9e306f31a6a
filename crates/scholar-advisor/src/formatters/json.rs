//! JSON output formatting.

use serde_json::{Value, json};

use crate::advisor::{Analysis, ProfileLookup};
use crate::error::AdvisorError;
use crate::models::ProfileRecord;

/// Create a compact profile representation for JSON output.
///
/// Unreported metrics are `null`, never `0`.
#[must_use]
pub fn compact_profile(record: &ProfileRecord) -> Value {
    let mut obj = json!({
        "name": record.display_name(),
        "citations": record.citation_count(),
        "hIndex": record.h_index(),
        "i10Index": record.i10_index(),
        "publications": record.publications(),
    });

    // Add optional fields only if present
    if let Some(affiliation) = record.affiliation() {
        obj["affiliation"] = json!(affiliation);
    }

    if let Some(by_year) = record.citations_by_year() {
        obj["citationsByYear"] = json!(by_year);
    }

    if !record.research_interests().is_empty() {
        obj["interests"] = json!(record.research_interests());
    }

    obj
}

/// Profile lookup result with its key.
#[must_use]
pub fn lookup_json(lookup: &ProfileLookup) -> Value {
    json!({
        "status": "ok",
        "searchKey": lookup.search_key,
        "cached": lookup.cached,
        "profile": compact_profile(&lookup.record),
    })
}

/// Full analysis result.
#[must_use]
pub fn analysis_json(analysis: &Analysis) -> Value {
    let mut obj = lookup_json(&analysis.lookup);
    obj["context"] = json!(analysis.context);
    obj["narrative"] = json!(analysis.narrative);
    obj["generatedAt"] = json!(analysis.generated_at.to_rfc3339());
    obj
}

/// Tagged error for front ends.
#[must_use]
pub fn error_json(err: &AdvisorError) -> Value {
    json!({
        "status": "error",
        "kind": err.kind(),
        "message": err.to_user_message(),
    })
}
