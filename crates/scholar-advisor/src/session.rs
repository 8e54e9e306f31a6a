//! Per-session result cache.
//!
//! Owned by whoever owns the user session (the stdio loop, an HTTP session
//! slot) and passed into the advisor on each request. Entries are keyed by the
//! normalized input. Any change to the submitted form clears the cache.

use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{AdvisorRequest, CareerStage, EducationLevel, ProfileRecord};

/// Form fields whose change invalidates cached records.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FormFields {
    raw_identifier: String,
    career_stage: CareerStage,
    education_level: EducationLevel,
    discipline: String,
    search_by_name: bool,
}

impl From<&AdvisorRequest> for FormFields {
    fn from(req: &AdvisorRequest) -> Self {
        Self {
            raw_identifier: req.raw_identifier.clone(),
            career_stage: req.career_stage,
            education_level: req.education_level,
            discipline: req.discipline.clone(),
            search_by_name: req.search_by_name,
        }
    }
}

/// Single-session cache of fetched profiles.
#[derive(Debug, Default)]
pub struct SessionCache {
    fields: Option<FormFields>,
    records: HashMap<String, Arc<ProfileRecord>>,
}

impl SessionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest form submission, clearing entries if any field changed.
    ///
    /// Returns true if the cache was invalidated.
    pub fn observe(&mut self, request: &AdvisorRequest) -> bool {
        let fields = FormFields::from(request);
        if self.fields.as_ref() == Some(&fields) {
            return false;
        }
        let invalidated = !self.records.is_empty();
        if invalidated {
            tracing::debug!("Form changed, clearing session cache");
        }
        self.records.clear();
        self.fields = Some(fields);
        invalidated
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<ProfileRecord>> {
        self.records.get(key).cloned()
    }

    pub fn insert(&mut self, key: impl Into<String>, record: Arc<ProfileRecord>) {
        self.records.insert(key.into(), record);
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.fields = None;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
