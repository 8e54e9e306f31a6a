//! Form input submitted by a front end.

use serde::{Deserialize, Serialize};

use super::{CareerStage, EducationLevel, ResponseFormat};

/// One submission of the advisor form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorRequest {
    /// Pasted profile link, identifier, or author name.
    pub raw_identifier: String,

    /// Current functional rank.
    #[serde(default)]
    pub career_stage: CareerStage,

    /// Highest completed degree.
    #[serde(default)]
    pub education_level: EducationLevel,

    /// Discipline or study program, free text.
    #[serde(default)]
    pub discipline: String,

    /// Treat the input as a name search regardless of its shape.
    #[serde(default)]
    pub search_by_name: bool,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl AdvisorRequest {
    /// Create a request with the given identifier text and defaults elsewhere.
    #[must_use]
    pub fn new(raw_identifier: impl Into<String>) -> Self {
        Self { raw_identifier: raw_identifier.into(), ..Self::default() }
    }
}
