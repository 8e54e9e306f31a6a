//! Markdown output formatting.

use crate::advisor::{Analysis, ProfileLookup};
use crate::error::AdvisorError;
use crate::models::ProfileRecord;

/// Format a profile record as Markdown.
#[must_use]
pub fn format_profile_markdown(record: &ProfileRecord) -> String {
    let mut output = format!("# {}\n\n", record.display_name());

    if let Some(affiliation) = record.affiliation() {
        output.push_str(&format!("**Affiliation**: {affiliation}\n\n"));
    }

    // Metrics
    output.push_str(&format!(
        "**Citations**: {} | **h-index**: {} | **i10-index**: {}\n\n",
        record.citation_count(),
        record.h_index(),
        record.i10_index()
    ));

    if !record.research_interests().is_empty() {
        output.push_str(&format!("**Interests**: {}\n\n", record.research_interests().join(", ")));
    }

    if let Some(by_year) = record.citations_by_year() {
        if !by_year.is_empty() {
            output.push_str("## Citations per year\n\n| Year | Citations |\n|------|-----------|\n");
            for (year, count) in by_year {
                output.push_str(&format!("| {year} | {count} |\n"));
            }
            output.push('\n');
        }
    }

    output.push_str(&format!("## Publications ({})\n\n", record.publications().len()));
    if record.publications().is_empty() {
        output.push_str("No publications reported.\n");
    } else {
        for (i, title) in record.publications().iter().enumerate() {
            output.push_str(&format!("{}. {}\n", i + 1, title));
        }
    }

    output
}

fn lookup_note(lookup: &ProfileLookup) -> String {
    let source = if lookup.cached { "session cache" } else { "profile source" };
    format!("_Resolved {} from {}._\n\n", lookup.search_key, source)
}

/// Format a finished analysis: profile summary followed by the narrative verbatim.
#[must_use]
pub fn format_analysis_markdown(analysis: &Analysis) -> String {
    let mut output = format_profile_markdown(&analysis.lookup.record);
    output.push('\n');
    output.push_str(&lookup_note(&analysis.lookup));

    let ctx = &analysis.context;
    output.push_str("---\n\n# Career assessment\n\n");
    output.push_str(&format!(
        "**Rank**: {} | **Education**: {}",
        ctx.career_stage, ctx.education_level
    ));
    if !ctx.discipline.is_empty() {
        output.push_str(&format!(" | **Discipline**: {}", ctx.discipline));
    }
    output.push_str("\n\n");

    output.push_str(&analysis.narrative);
    if !analysis.narrative.ends_with('\n') {
        output.push('\n');
    }
    output.push_str(&format!(
        "\n_Generated at {}_\n",
        analysis.generated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    output
}

/// Format an error for display.
#[must_use]
pub fn format_error_markdown(err: &AdvisorError) -> String {
    format!("**Error** ({}): {}\n", err.kind(), err.to_user_message())
}
