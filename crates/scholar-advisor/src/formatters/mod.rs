//! Output formatters for profiles and analyses.

mod json;
mod markdown;

pub use json::{analysis_json, compact_profile, error_json, lookup_json};
pub use markdown::{format_analysis_markdown, format_error_markdown, format_profile_markdown};
