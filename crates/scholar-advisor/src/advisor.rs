//! The advisor pipeline: form input in, profile and narrative out.
//!
//! 1. Validate and normalize the pasted identifier
//! 2. Classify it into a search key
//! 3. Serve the profile from the session cache or fetch it
//! 4. Assemble the prompt and hand it to the generator

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::client::ScholarClient;
use crate::config::Config;
use crate::error::{AdvisorError, AdvisorResult};
use crate::fetcher::{CancelSignal, ProfileFetcher};
use crate::generation::{CareerContext, GeminiClient, NarrativeGenerator, build_prompt};
use crate::models::{AdvisorRequest, ProfileRecord};
use crate::normalize::{KeyClassifier, LengthHeuristic, SearchKey, normalize};
use crate::session::SessionCache;

/// A resolved profile.
#[derive(Debug, Clone)]
pub struct ProfileLookup {
    /// Key the profile was resolved from.
    pub search_key: SearchKey,
    /// The fetched record.
    pub record: Arc<ProfileRecord>,
    /// Whether the record came from the session cache.
    pub cached: bool,
}

/// A finished assessment.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Profile the narrative is based on.
    pub lookup: ProfileLookup,
    /// Context the user supplied.
    pub context: CareerContext,
    /// Generated text, verbatim.
    pub narrative: String,
    /// When the narrative was produced.
    pub generated_at: DateTime<Utc>,
}

/// Shared pipeline state. Cheap to clone.
#[derive(Clone)]
pub struct Advisor {
    fetcher: ProfileFetcher,
    generator: Arc<dyn NarrativeGenerator>,
    classifier: Arc<dyn KeyClassifier>,
    max_attempts: u32,
}

impl Advisor {
    /// Create an advisor from its collaborators.
    #[must_use]
    pub fn new(
        fetcher: ProfileFetcher,
        generator: Arc<dyn NarrativeGenerator>,
        max_attempts: u32,
    ) -> Self {
        Self {
            fetcher,
            generator,
            classifier: Arc::new(LengthHeuristic::default()),
            max_attempts: max_attempts.max(1),
        }
    }

    /// Wire the HTTP profile client and the generation client from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if either HTTP client fails to build.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let source = Arc::new(ScholarClient::new(config)?);
        let generator = Arc::new(GeminiClient::new(config)?);
        let fetcher = ProfileFetcher::from_config(source, config);
        Ok(Self::new(fetcher, generator, config.max_attempts))
    }

    /// Replace the identifier/name heuristic.
    #[must_use]
    pub fn with_classifier(mut self, classifier: Arc<dyn KeyClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Derive the search key for a request.
    ///
    /// # Errors
    ///
    /// Returns a validation error when nothing usable was entered.
    pub fn search_key(&self, request: &AdvisorRequest) -> AdvisorResult<SearchKey> {
        if request.search_by_name {
            let name = request.raw_identifier.trim();
            if name.is_empty() {
                return Err(AdvisorError::validation("rawIdentifier", "name cannot be empty"));
            }
            return Ok(SearchKey::DisplayName(name.to_string()));
        }

        let text = normalize(&request.raw_identifier);
        if text.is_empty() {
            return Err(AdvisorError::validation(
                "rawIdentifier",
                "enter a scholar ID, profile link, or name",
            ));
        }
        Ok(self.classifier.classify(&text))
    }

    /// Resolve the profile for a request, using and filling the session cache.
    ///
    /// # Errors
    ///
    /// Validation and fetch errors.
    pub async fn profile(
        &self,
        request: &AdvisorRequest,
        session: &mut SessionCache,
        cancel: CancelSignal,
    ) -> AdvisorResult<ProfileLookup> {
        let search_key = self.search_key(request)?;
        session.observe(request);

        let cache_key = search_key.to_string();
        if let Some(record) = session.get(&cache_key) {
            tracing::debug!(key = %search_key, "Profile served from session cache");
            return Ok(ProfileLookup { search_key, record, cached: true });
        }

        let record =
            Arc::new(self.fetcher.fetch_with_cancel(&search_key, self.max_attempts, cancel).await?);
        session.insert(cache_key, Arc::clone(&record));

        Ok(ProfileLookup { search_key, record, cached: false })
    }

    /// Run the full assessment.
    ///
    /// # Errors
    ///
    /// Validation, fetch, and generation errors. No narrative is produced
    /// without a profile.
    pub async fn analyze(
        &self,
        request: &AdvisorRequest,
        session: &mut SessionCache,
        cancel: CancelSignal,
    ) -> AdvisorResult<Analysis> {
        let lookup = self.profile(request, session, cancel).await?;
        let context = CareerContext::from(request);
        let prompt = build_prompt(&lookup.record, &context);

        tracing::info!(
            name = lookup.record.display_name(),
            stage = %context.career_stage,
            "Requesting narrative"
        );
        let narrative = self.generator.generate(&prompt).await?;

        Ok(Analysis { lookup, context, narrative, generated_at: Utc::now() })
    }
}

impl std::fmt::Debug for Advisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Advisor")
            .field("fetcher", &self.fetcher)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}
