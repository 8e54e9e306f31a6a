//! Configuration for the scholar advisor.

use std::time::Duration;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Base URL for the author profile API.
    pub const SCHOLAR_API: &str = "https://api.semanticscholar.org/graph/v1";

    /// Base URL for the Generative Language API.
    pub const GENERATION_API: &str = "https://generativelanguage.googleapis.com/v1beta";

    /// Models tried in order until one is available.
    pub const DEFAULT_MODELS: &[&str] = &["gemini-1.5-flash", "gemini-1.5-pro", "gemini-pro"];

    /// Request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Generation request timeout (narratives take a while).
    pub const GENERATION_TIMEOUT: Duration = Duration::from_secs(120);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Delay between requests to the profile source without API key (1 req/s).
    pub const RATE_LIMIT_DELAY: Duration = Duration::from_secs(1);

    /// Delay between requests to the profile source with API key (10 req/s).
    pub const RATE_LIMIT_DELAY_WITH_KEY: Duration = Duration::from_millis(100);

    /// Fetch attempts per lookup.
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Lower bound of the randomized backoff between attempts.
    pub const BACKOFF_MIN: Duration = Duration::from_secs(2);

    /// Upper bound of the randomized backoff between attempts.
    pub const BACKOFF_MAX: Duration = Duration::from_secs(5);

    /// Publications requested during enrichment.
    pub const PUBLICATION_LIMIT: u32 = 100;

    /// Page size for name searches.
    pub const SEARCH_PAGE_SIZE: u32 = 10;

    /// Maximum output tokens requested from the generation API.
    pub const MAX_OUTPUT_TOKENS: u32 = 4096;

    /// Response cache TTL (5 minutes).
    pub const CACHE_TTL: Duration = Duration::from_secs(300);

    /// Maximum cache size.
    pub const CACHE_MAX_SIZE: u64 = 1000;

    /// Idle time after which a server-side session is dropped.
    pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(3600);

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);
}

/// Author field sets for API requests.
pub mod fields {
    /// Fields needed to identify a candidate.
    pub const CANDIDATE: &[&str] = &["authorId", "name", "affiliations"];

    /// Fields needed for the full profile record.
    ///
    /// The Graph author endpoint has no i10-index, per-year citations or
    /// interests, and rejects unknown field names with a 400. Those parts of
    /// the record come from sources that send them unasked, or stay unknown
    /// (the i10-index is derived when the paper list is complete).
    pub const PROFILE: &[&str] =
        &["authorId", "name", "affiliations", "paperCount", "citationCount", "hIndex"];

    /// Fields requested for each publication.
    pub const PUBLICATION: &[&str] = &["title", "year", "citationCount"];
}

/// Advisor configuration.
#[derive(Clone)]
pub struct Config {
    /// Profile source API key (optional).
    pub scholar_api_key: Option<String>,

    /// Generation API key. Required for narratives, not for profile lookups.
    pub generation_api_key: Option<String>,

    /// Base URL of the profile source (for testing with mock servers).
    pub scholar_api_url: String,

    /// Base URL of the generation API (for testing with mock servers).
    pub generation_api_url: String,

    /// Generation models, tried in order.
    pub models: Vec<String>,

    /// Request timeout for the profile source.
    pub request_timeout: Duration,

    /// Request timeout for the generation API.
    pub generation_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Minimum spacing between profile source requests.
    pub rate_limit_delay: Duration,

    /// Fetch attempts per lookup (at least 1).
    pub max_attempts: u32,

    /// Lower bound of the randomized backoff.
    pub backoff_min: Duration,

    /// Upper bound of the randomized backoff.
    pub backoff_max: Duration,

    /// Publications requested during enrichment.
    pub publication_limit: u32,

    /// Page size for name searches.
    pub search_page_size: u32,

    /// Maximum output tokens for generation.
    pub max_output_tokens: u32,

    /// Response cache TTL.
    pub cache_ttl: Duration,

    /// Maximum response cache size.
    pub cache_max_size: u64,
}

impl Config {
    /// Create a new configuration with optional API keys.
    ///
    /// The request spacing is relaxed when a profile source key is present.
    #[must_use]
    pub fn new(scholar_api_key: Option<String>, generation_api_key: Option<String>) -> Self {
        let rate_limit_delay = default_rate_limit_delay(scholar_api_key.is_some());
        Self {
            scholar_api_key,
            generation_api_key,
            scholar_api_url: api::SCHOLAR_API.to_string(),
            generation_api_url: api::GENERATION_API.to_string(),
            models: api::DEFAULT_MODELS.iter().map(ToString::to_string).collect(),
            request_timeout: api::REQUEST_TIMEOUT,
            generation_timeout: api::GENERATION_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            rate_limit_delay,
            max_attempts: api::MAX_ATTEMPTS,
            backoff_min: api::BACKOFF_MIN,
            backoff_max: api::BACKOFF_MAX,
            publication_limit: api::PUBLICATION_LIMIT,
            search_page_size: api::SEARCH_PAGE_SIZE,
            max_output_tokens: api::MAX_OUTPUT_TOKENS,
            cache_ttl: api::CACHE_TTL,
            cache_max_size: api::CACHE_MAX_SIZE,
        }
    }

    /// Create a test configuration pointing both APIs at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            scholar_api_key: None,
            generation_api_key: Some("test-key".to_string()),
            scholar_api_url: format!("{base_url}/graph/v1"),
            generation_api_url: format!("{base_url}/v1beta"),
            models: vec!["test-model".to_string()],
            request_timeout: Duration::from_secs(5),
            generation_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            rate_limit_delay: Duration::ZERO, // No delay in tests
            max_attempts: api::MAX_ATTEMPTS,
            backoff_min: Duration::ZERO,
            backoff_max: Duration::ZERO,
            publication_limit: api::PUBLICATION_LIMIT,
            search_page_size: api::SEARCH_PAGE_SIZE,
            max_output_tokens: 256,
            cache_ttl: Duration::ZERO, // No caching in tests
            cache_max_size: 0,
        }
    }

    /// Create configuration from environment variables (and a `.env` file if present).
    ///
    /// The result is not validated; apply any overrides, then call [`Config::validate`].
    ///
    /// # Errors
    ///
    /// Returns error if a numeric variable does not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create configuration from a variable lookup, e.g. the process environment.
    ///
    /// # Errors
    ///
    /// Returns error if a numeric variable does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::new(lookup("SCHOLAR_API_KEY"), lookup("GEMINI_API_KEY"));

        if let Some(url) = lookup("SCHOLAR_API_URL") {
            config.scholar_api_url = url;
        }
        if let Some(models) = lookup("GEMINI_MODELS") {
            config.models = parse_model_list(&models);
        }
        if let Some(attempts) = lookup("ADVISOR_MAX_ATTEMPTS") {
            config.max_attempts = attempts.parse()?;
        }
        if let Some(ms) = lookup("ADVISOR_BACKOFF_MIN_MS") {
            config.backoff_min = Duration::from_millis(ms.parse()?);
        }
        if let Some(ms) = lookup("ADVISOR_BACKOFF_MAX_MS") {
            config.backoff_max = Duration::from_millis(ms.parse()?);
        }

        Ok(config)
    }

    /// Replace the profile source key and reset request spacing to match.
    pub fn set_scholar_api_key(&mut self, key: Option<String>) {
        self.rate_limit_delay = default_rate_limit_delay(key.is_some());
        self.scholar_api_key = key;
    }

    /// Check invariants that the rest of the crate relies on.
    ///
    /// # Errors
    ///
    /// Returns error on zero attempts, inverted backoff bounds, no models, or bad URLs.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.max_attempts >= 1, "max_attempts must be at least 1");
        anyhow::ensure!(
            self.backoff_min <= self.backoff_max,
            "backoff_min ({:?}) exceeds backoff_max ({:?})",
            self.backoff_min,
            self.backoff_max
        );
        anyhow::ensure!(!self.models.is_empty(), "at least one generation model is required");
        url::Url::parse(&self.scholar_api_url)
            .map_err(|e| anyhow::anyhow!("invalid scholar API URL '{}': {e}", self.scholar_api_url))?;
        url::Url::parse(&self.generation_api_url).map_err(|e| {
            anyhow::anyhow!("invalid generation API URL '{}': {e}", self.generation_api_url)
        })?;
        Ok(())
    }

    /// Check if a profile source API key is configured.
    #[must_use]
    pub const fn has_scholar_api_key(&self) -> bool {
        self.scholar_api_key.is_some()
    }

    /// Check if a generation API key is configured.
    #[must_use]
    pub const fn has_generation_api_key(&self) -> bool {
        self.generation_api_key.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("scholar_api_url", &self.scholar_api_url)
            .field("has_scholar_api_key", &self.has_scholar_api_key())
            .field("has_generation_api_key", &self.has_generation_api_key())
            .field("models", &self.models)
            .field("max_attempts", &self.max_attempts)
            .field("backoff_min", &self.backoff_min)
            .field("backoff_max", &self.backoff_max)
            .finish()
    }
}

/// Split a comma-separated model list, dropping blanks.
#[must_use]
pub fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|m| !m.is_empty()).map(ToString::to_string).collect()
}

const fn default_rate_limit_delay(has_key: bool) -> Duration {
    if has_key { api::RATE_LIMIT_DELAY_WITH_KEY } else { api::RATE_LIMIT_DELAY }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(!config.has_scholar_api_key());
        assert!(!config.has_generation_api_key());
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.backoff_min, Duration::from_secs(2));
        assert_eq!(config.backoff_max, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_with_scholar_key_relaxes_spacing() {
        let config = Config::new(Some("key".to_string()), None);
        assert!(config.has_scholar_api_key());
        assert!(config.rate_limit_delay < Config::default().rate_limit_delay);
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = Config::default();
        config.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_backoff() {
        let mut config = Config::default();
        config.backoff_min = Duration::from_secs(10);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = Config::default();
        config.scholar_api_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_set_scholar_api_key_recomputes_spacing() {
        let mut config = Config::default();
        config.set_scholar_api_key(Some("key".to_string()));
        assert!(config.has_scholar_api_key());
        assert_eq!(config.rate_limit_delay, api::RATE_LIMIT_DELAY_WITH_KEY);

        config.set_scholar_api_key(None);
        assert_eq!(config.rate_limit_delay, api::RATE_LIMIT_DELAY);
    }

    #[test]
    fn test_from_lookup_defers_validation_to_overrides() {
        let env = |name: &str| (name == "ADVISOR_BACKOFF_MIN_MS").then(|| "6000".to_string());
        let mut config = Config::from_lookup(env).unwrap();
        assert_eq!(config.backoff_min, Duration::from_secs(6));
        assert!(config.validate().is_err());

        config.backoff_max = Duration::from_secs(10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_key_relaxes_spacing() {
        let env = |name: &str| (name == "SCHOLAR_API_KEY").then(|| "key".to_string());
        let config = Config::from_lookup(env).unwrap();
        assert_eq!(config.rate_limit_delay, api::RATE_LIMIT_DELAY_WITH_KEY);
    }

    #[test]
    fn test_from_lookup_rejects_non_numeric() {
        let env = |name: &str| (name == "ADVISOR_MAX_ATTEMPTS").then(|| "three".to_string());
        assert!(Config::from_lookup(env).is_err());
    }

    #[test]
    fn test_parse_model_list() {
        assert_eq!(parse_model_list(" a, b ,,c "), vec!["a", "b", "c"]);
        assert!(parse_model_list(" , ").is_empty());
    }

    #[test]
    fn test_debug_hides_keys() {
        let config = Config::new(Some("scholar-secret".to_string()), Some("gen-secret".to_string()));
        let debug = format!("{config:?}");
        assert!(!debug.contains("scholar-secret"));
        assert!(!debug.contains("gen-secret"));
    }
}
