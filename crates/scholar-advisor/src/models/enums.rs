//! Enumeration types for form fields and output selection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Output format for rendered results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Human-readable Markdown format.
    #[default]
    Markdown,
    /// Machine-readable JSON format.
    Json,
}

impl ResponseFormat {
    /// Check if this is JSON format.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Functional academic rank (jabatan fungsional) of a lecturer.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum CareerStage {
    /// Teaching staff without a functional rank.
    #[default]
    TeachingStaff,
    /// Asisten Ahli.
    AssistantProfessor,
    /// Lektor.
    Lektor,
    /// Lektor Kepala.
    LektorKepala,
    /// Guru Besar.
    Professor,
}

impl CareerStage {
    /// All stages, lowest first.
    pub const ALL: [Self; 5] = [
        Self::TeachingStaff,
        Self::AssistantProfessor,
        Self::Lektor,
        Self::LektorKepala,
        Self::Professor,
    ];

    /// Label shown to users and placed in prompts.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TeachingStaff => "Tenaga Pengajar",
            Self::AssistantProfessor => "Asisten Ahli",
            Self::Lektor => "Lektor",
            Self::LektorKepala => "Lektor Kepala",
            Self::Professor => "Guru Besar",
        }
    }

    /// The next rank up, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::TeachingStaff => Some(Self::AssistantProfessor),
            Self::AssistantProfessor => Some(Self::Lektor),
            Self::Lektor => Some(Self::LektorKepala),
            Self::LektorKepala => Some(Self::Professor),
            Self::Professor => None,
        }
    }
}

impl fmt::Display for CareerStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Highest completed degree.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum EducationLevel {
    /// S2 (Magister).
    #[default]
    Master,
    /// S3 (Doktor).
    Doctorate,
}

impl EducationLevel {
    /// Label shown to users and placed in prompts.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Master => "S2 (Magister)",
            Self::Doctorate => "S3 (Doktor)",
        }
    }
}

impl fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
