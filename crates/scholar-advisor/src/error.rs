//! Error types for the scholar advisor.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.
//! Each layer has its own enum: the HTTP client, the resilient fetcher, the
//! generation service, and the advisor pipeline that ties them together.

use std::time::Duration;

/// Errors from the HTTP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limited or blocked by the profile source (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Resource not found (404 response)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// Invalid request parameters (400 response)
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from API
        message: String,
    },

    /// Request timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
}

impl ClientError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds) }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Returns true if the upstream reported the resource as absent.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this error is retryable at the HTTP level.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Timeout(_) | Self::Server { .. })
    }

    /// Get the retry-after duration if this is a rate limit error.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

/// Failures observable by callers of the resilient fetcher.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The source has no profile for this key. Never retried.
    #[error("No profile found for {key}")]
    NotFound {
        /// The identifier or name that was searched
        key: String,
    },

    /// Every attempt failed transiently.
    #[error("Profile source unavailable after {attempts} attempt(s): {last_error}")]
    Exhausted {
        /// Number of attempts made
        attempts: u32,
        /// Message of the last underlying error
        last_error: String,
    },

    /// The caller cancelled between attempts.
    #[error("Fetch cancelled")]
    Cancelled,
}

impl FetchError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Returns true if retrying later with the same key cannot help.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors from the text-generation service.
#[derive(thiserror::Error, Debug)]
pub enum GenerationError {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the generation API
    #[error("Generation API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },

    /// None of the configured models could be used
    #[error("No generation model available (tried: {})", tried.join(", "))]
    ModelUnavailable {
        /// Model names tried, in order
        tried: Vec<String>,
    },

    /// The service answered without any text
    #[error("Generation API returned no text")]
    EmptyResponse,

    /// No API key configured
    #[error("Generation API key is not configured")]
    MissingApiKey,
}

/// Errors from the advisor pipeline.
#[derive(thiserror::Error, Debug)]
pub enum AdvisorError {
    /// Profile fetch failed
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Narrative generation failed
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Input validation failed
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AdvisorError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// Short machine-readable tag for front ends.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Fetch(FetchError::NotFound { .. }) => "not_found",
            Self::Fetch(FetchError::Exhausted { .. }) => "exhausted",
            Self::Fetch(FetchError::Cancelled) => "cancelled",
            Self::Generation(_) => "generation",
            Self::Validation { .. } => "validation",
            Self::Serialization(_) => "serialization",
        }
    }

    /// Convert to a user-friendly message for the warning banner.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::Fetch(FetchError::NotFound { key }) => {
                format!("No scholar profile found for '{key}'. Please check the ID or name.")
            }
            Self::Fetch(FetchError::Exhausted { attempts, last_error }) => {
                format!(
                    "The profile source is busy or blocking requests ({attempts} attempts, last error: {last_error}). Please try again later."
                )
            }
            Self::Generation(GenerationError::ModelUnavailable { tried }) => {
                format!("No generation model is available right now (tried {}).", tried.join(", "))
            }
            Self::Validation { field, message } => {
                format!("Invalid input for '{field}': {message}")
            }
            _ => self.to_string(),
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for generation calls.
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Result type alias for advisor operations.
pub type AdvisorResult<T> = Result<T, AdvisorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_retryable() {
        assert!(ClientError::rate_limited(60).is_retryable());
        assert!(ClientError::Timeout(Duration::from_secs(30)).is_retryable());
        assert!(ClientError::server(500, "Internal error").is_retryable());

        assert!(!ClientError::not_found("author 123").is_retryable());
        assert!(!ClientError::bad_request("invalid query").is_retryable());
    }

    #[test]
    fn test_client_error_not_found() {
        assert!(ClientError::not_found("author 123").is_not_found());
        assert!(!ClientError::server(404, "proxy").is_not_found());
        assert!(!ClientError::rate_limited(1).is_not_found());
    }

    #[test]
    fn test_client_error_retry_after() {
        let err = ClientError::rate_limited(60);
        assert_eq!(err.retry_after(), Some(Duration::from_secs(60)));

        let err = ClientError::not_found("author");
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn test_fetch_error_terminal() {
        assert!(FetchError::not_found("ABC123").is_terminal());
        assert!(
            !FetchError::Exhausted { attempts: 3, last_error: "429".to_string() }.is_terminal()
        );
        assert!(!FetchError::Cancelled.is_terminal());
    }

    #[test]
    fn test_advisor_error_user_message() {
        let err = AdvisorError::validation("raw_identifier", "cannot be empty");
        assert!(err.to_user_message().contains("raw_identifier"));
        assert!(err.to_user_message().contains("cannot be empty"));
        assert_eq!(err.kind(), "validation");

        let err = AdvisorError::from(FetchError::Exhausted {
            attempts: 3,
            last_error: "blocked".to_string(),
        });
        assert!(err.to_user_message().contains("try again later"));
        assert!(err.to_user_message().contains("blocked"));
        assert_eq!(err.kind(), "exhausted");
    }

    #[test]
    fn test_not_found_message_differs_from_exhausted() {
        let not_found = AdvisorError::from(FetchError::not_found("XYZ"));
        let exhausted =
            AdvisorError::from(FetchError::Exhausted { attempts: 1, last_error: String::new() });
        assert_ne!(not_found.to_user_message(), exhausted.to_user_message());
        assert!(not_found.to_user_message().contains("XYZ"));
    }
}
