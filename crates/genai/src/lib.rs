//! Text generation interface used for catalog descriptions and the reading assistant.
//!
//! Every failure here is recoverable: callers degrade to a missing description
//! or a canned reply instead of surfacing the error.

pub mod gemini;
pub mod module;

pub use gemini::GeminiClient;
pub use module::GeneratorModule;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use libris_kernel::settings::AssistantSettings;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("text generation is not configured")]
    NotConfigured,

    #[error("request to text generation service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("text generation service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("text generation service returned no text")]
    EmptyResponse,

    #[error("text generation timed out after {0:?}")]
    Timeout(Duration),
}

/// Produces natural-language text from a prompt
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Generator used when no API key is configured; every call fails softly
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::NotConfigured)
    }
}

/// Run `generate` under a deadline and trim the result. Blank output counts as a failure.
pub async fn generate_within(
    generator: &dyn TextGenerator,
    prompt: &str,
    limit: Duration,
) -> Result<String, GenerationError> {
    let text = tokio::time::timeout(limit, generator.generate(prompt))
        .await
        .map_err(|_| GenerationError::Timeout(limit))??;

    let text = text.trim();
    if text.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(text.to_string())
}

/// Build the generator described by `settings`
pub fn from_settings(settings: &AssistantSettings) -> Result<Arc<dyn TextGenerator>, GenerationError> {
    match settings.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => Ok(Arc::new(GeminiClient::new(
            &settings.endpoint,
            &settings.model,
            key,
            Duration::from_millis(settings.timeout_ms),
        )?)),
        _ => Ok(Arc::new(DisabledGenerator)),
    }
}
