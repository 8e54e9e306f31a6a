//! Narrative generation: prompt assembly and the hosted text-generation service.

mod gemini;
mod prompt;

pub use gemini::GeminiClient;
pub use prompt::{CareerContext, PROMPT_PUBLICATIONS, build_prompt};

use crate::error::GenerationResult;

/// Turns a prompt into a narrative.
///
/// The returned text is opaque and shown to the user verbatim.
#[async_trait::async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> GenerationResult<String>;
}
