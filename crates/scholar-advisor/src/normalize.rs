//! Identifier normalization and search key classification.
//!
//! Users paste anything from a bare identifier to a full profile URL with
//! tracking parameters. [`normalize`] reduces that to the identifier text, and a
//! [`KeyClassifier`] decides whether the result names a profile directly or has to
//! be searched for as a person's name.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Query parameter that carries the profile identifier in profile URLs.
pub const ID_MARKER: &str = "user=";

/// Separator between query parameters.
pub const PARAM_SEPARATOR: char = '&';

/// Length at or above which space-free text is treated as a name.
pub const DEFAULT_NAME_THRESHOLD: usize = 20;

/// Extract the canonical identifier from pasted text.
///
/// Never fails; unrecognized input comes back trimmed. Only the first
/// identifier marker is honored, and the extracted token stops at the next
/// parameter separator or the next marker, so `normalize` is idempotent.
#[must_use]
pub fn normalize(raw: &str) -> String {
    if let Some(pos) = raw.find(ID_MARKER) {
        let rest = &raw[pos + ID_MARKER.len()..];
        let end = [rest.find(PARAM_SEPARATOR), rest.find(ID_MARKER)]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(rest.len());
        return rest[..end].trim().to_string();
    }

    match raw.split_once(PARAM_SEPARATOR) {
        Some((head, _)) => head.trim().to_string(),
        None => raw.trim().to_string(),
    }
}

/// What the fetcher should look up.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SearchKey {
    /// Opaque profile identifier, looked up directly.
    Identifier(String),
    /// Human name, resolved through a relevance-ranked search.
    DisplayName(String),
}

impl SearchKey {
    /// The text of the key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Identifier(s) | Self::DisplayName(s) => s,
        }
    }

    #[must_use]
    pub const fn is_identifier(&self) -> bool {
        matches!(self, Self::Identifier(_))
    }
}

impl fmt::Display for SearchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(id) => write!(f, "id '{id}'"),
            Self::DisplayName(name) => write!(f, "name '{name}'"),
        }
    }
}

/// Decides whether text denotes an identifier or a display name.
///
/// Implemented for any `Fn(&str) -> bool` returning `true` for names, so tests
/// and callers can swap the heuristic without touching the fetch loop.
pub trait KeyClassifier: Send + Sync {
    /// Returns true if `text` should be searched as a person's name.
    fn is_display_name(&self, text: &str) -> bool;

    /// Wrap `text` in the matching [`SearchKey`] variant.
    fn classify(&self, text: &str) -> SearchKey {
        if self.is_display_name(text) {
            SearchKey::DisplayName(text.to_string())
        } else {
            SearchKey::Identifier(text.to_string())
        }
    }
}

impl<F> KeyClassifier for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_display_name(&self, text: &str) -> bool {
        self(text)
    }
}

/// Whitespace-or-length heuristic.
///
/// Lossy by nature: a short single-word name is taken for an identifier, and an
/// identifier at or above the threshold is taken for a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthHeuristic {
    /// Character count at or above which text counts as a name.
    pub threshold: usize,
}

impl Default for LengthHeuristic {
    fn default() -> Self {
        Self { threshold: DEFAULT_NAME_THRESHOLD }
    }
}

impl KeyClassifier for LengthHeuristic {
    fn is_display_name(&self, text: &str) -> bool {
        text.chars().any(char::is_whitespace) || text.chars().count() >= self.threshold
    }
}

/// Classify with the default heuristic.
#[must_use]
pub fn classify(text: &str) -> SearchKey {
    LengthHeuristic::default().classify(text)
}
