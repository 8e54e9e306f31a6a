//! Data models for profiles, upstream API entities, and form input.
//!
//! Upstream models use `#[serde(default)]` for optional fields and
//! `#[serde(rename_all = "camelCase")]` to match API naming.

mod author;
mod enums;
mod inputs;
mod profile;

pub use author::{AuthorDetail, AuthorPapersResult, AuthorSearchResult, Candidate, PaperSummary};
pub use enums::{CareerStage, EducationLevel, ResponseFormat};
pub use inputs::AdvisorRequest;
pub use profile::{Metric, ProfileRecord, PublicationTitle, UNKNOWN_AUTHOR};
