//! Generative Language API client with model fallback.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::NarrativeGenerator;
use crate::config::Config;
use crate::error::{GenerationError, GenerationResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Client for the `generateContent` endpoint.
///
/// Models are tried in configured order; a 404 for a model moves on to the next
/// one, any other failure is returned as-is.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    models: Vec<String>,
    max_output_tokens: u32,
}

impl GeminiClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.generation_timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            client,
            api_key: config.generation_api_key.clone(),
            base_url: config.generation_api_url.trim_end_matches('/').to_string(),
            models: config.models.clone(),
            max_output_tokens: config.max_output_tokens,
        })
    }

    /// Models in the order they are tried.
    #[must_use]
    pub fn models(&self) -> &[String] {
        &self.models
    }

    async fn generate_with(&self, model: &str, key: &str, prompt: &str) -> GenerationResult<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let body = GenerateRequest {
            contents: vec![Content { parts: vec![Part { text: prompt }] }],
            generation_config: GenerationConfig { max_output_tokens: self.max_output_tokens },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api { status: status.as_u16(), message });
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed.into_text().ok_or(GenerationError::EmptyResponse)
    }
}

#[async_trait::async_trait]
impl NarrativeGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> GenerationResult<String> {
        let key = self.api_key.as_deref().ok_or(GenerationError::MissingApiKey)?;
        let mut tried = Vec::with_capacity(self.models.len());

        for model in &self.models {
            tracing::debug!(model, "Calling generation API");
            match self.generate_with(model, key, prompt).await {
                Ok(text) => {
                    tracing::info!(model, chars = text.len(), "Narrative generated");
                    return Ok(text);
                }
                Err(GenerationError::Api { status: 404, message }) => {
                    tracing::warn!(model, %message, "Model unavailable, trying next");
                    tried.push(model.clone());
                }
                Err(e) => return Err(e),
            }
        }

        Err(GenerationError::ModelUnavailable { tried })
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("models", &self.models)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text_joined() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"Hello "},{"text":"world"}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("Hello world"));
    }

    #[test]
    fn test_response_without_text() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(parsed.into_text().is_none());
        let parsed: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert!(parsed.into_text().is_none());
    }

    #[test]
    fn test_request_shape() {
        let body = GenerateRequest {
            contents: vec![Content { parts: vec![Part { text: "hi" }] }],
            generation_config: GenerationConfig { max_output_tokens: 10 },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 10);
    }

    #[test]
    fn test_debug_hides_key() {
        let mut config = Config::default();
        config.generation_api_key = Some("very-secret".to_string());
        let client = GeminiClient::new(&config).unwrap();
        assert!(!format!("{client:?}").contains("very-secret"));
    }
}
