use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::config::AiSettings;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider {provider} is unavailable")]
    Unavailable { provider: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider returned an empty reply")]
    EmptyResponse,

    #[error("could not decode provider reply: {0}")]
    Decode(String),
}

/// A prompt split into the standing instruction and the request itself.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
}

/// External text-generation backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Backend compiled in and credential configured.
    fn is_available(&self) -> bool;

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError>;
}

/// Stand-in used when AI summaries are switched off or cannot be served.
#[derive(Debug, Default, Clone)]
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    fn name(&self) -> &str {
        "disabled"
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn generate(&self, _request: &GenerationRequest) -> Result<String, ProviderError> {
        Err(ProviderError::Unavailable {
            provider: self.name().to_string(),
        })
    }
}

/// Pick the backend for the given settings.
pub fn create_generator(settings: &AiSettings) -> Arc<dyn TextGenerator> {
    if !settings.enabled || !settings.has_usable_credential() {
        info!(
            enabled = settings.enabled,
            "AI summaries disabled or no usable credential; using statistical analysis"
        );
        return Arc::new(DisabledGenerator);
    }
    backend(settings)
}

#[cfg(feature = "openai")]
fn backend(settings: &AiSettings) -> Arc<dyn TextGenerator> {
    match super::openai::OpenAiGenerator::new(settings) {
        Ok(generator) => Arc::new(generator),
        Err(e) => {
            tracing::warn!(error = %e, "could not build OpenAI client");
            Arc::new(DisabledGenerator)
        }
    }
}

#[cfg(not(feature = "openai"))]
fn backend(_settings: &AiSettings) -> Arc<dyn TextGenerator> {
    info!("built without the `openai` feature; using statistical analysis");
    Arc::new(DisabledGenerator)
}
