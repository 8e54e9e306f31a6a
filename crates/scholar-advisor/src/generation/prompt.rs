//! Prompt assembly for the career assessment narrative.

use serde::{Deserialize, Serialize};

use crate::models::{AdvisorRequest, CareerStage, EducationLevel, ProfileRecord};

/// Publications listed in the prompt.
pub const PROMPT_PUBLICATIONS: usize = 5;

/// Caller-supplied context that accompanies the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerContext {
    pub career_stage: CareerStage,
    pub education_level: EducationLevel,
    pub discipline: String,
}

impl From<&AdvisorRequest> for CareerContext {
    fn from(req: &AdvisorRequest) -> Self {
        Self {
            career_stage: req.career_stage,
            education_level: req.education_level,
            discipline: req.discipline.trim().to_string(),
        }
    }
}

/// Build the instruction text sent to the generation service.
///
/// Record values are inserted unchanged; unreported metrics read "unknown".
#[must_use]
pub fn build_prompt(record: &ProfileRecord, context: &CareerContext) -> String {
    let discipline =
        if context.discipline.is_empty() { "(not specified)" } else { context.discipline.as_str() };
    let target = context
        .career_stage
        .next()
        .map_or_else(|| "maintaining the current rank".to_string(), |s| format!("promotion to {s}"));

    let publications = if record.publications().is_empty() {
        "  (none reported)".to_string()
    } else {
        record
            .top_publications(PROMPT_PUBLICATIONS)
            .iter()
            .map(|t| format!("  - {t}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut prompt = String::new();
    prompt.push_str(
        "Act as an assessor of lecturer credit scores (Penilaian Angka Kredit) in Indonesia.\n\n",
    );
    prompt.push_str("LECTURER DATA:\n");
    prompt.push_str(&format!("- Name: {}\n", record.display_name()));
    if let Some(affiliation) = record.affiliation() {
        prompt.push_str(&format!("- Affiliation: {affiliation}\n"));
    }
    prompt.push_str(&format!("- Current rank: {}\n", context.career_stage));
    prompt.push_str(&format!("- Highest education: {}\n", context.education_level));
    prompt.push_str(&format!("- Discipline: {discipline}\n"));
    prompt.push_str(&format!("- Scholar h-index: {}\n", record.h_index()));
    prompt.push_str(&format!("- i10-index: {}\n", record.i10_index()));
    prompt.push_str(&format!("- Total citations: {}\n", record.citation_count()));
    if !record.research_interests().is_empty() {
        prompt.push_str(&format!("- Research interests: {}\n", record.research_interests().join(", ")));
    }
    prompt.push_str(&format!("- Top {PROMPT_PUBLICATIONS} publications:\n{publications}\n\n"));

    prompt.push_str("YOUR TASKS:\n");
    prompt.push_str(&format!(
        "1. **Position analysis**: with an h-index of {} at the rank of {}, is this lecturer ready for {}? What is missing?\n",
        record.h_index(),
        context.career_stage,
        target
    ));
    prompt.push_str(&format!(
        "2. **Research recommendations**: propose 3 research titles on '{discipline}' with strong citation potential.\n"
    ));
    prompt.push_str(
        "3. **Career roadmap**: a concrete checklist of targets for the next 12 months towards promotion or lecturer certification.\n\n",
    );
    prompt.push_str("Use a professional, motivating tone and tidy bullet points.\n");
    prompt
}
