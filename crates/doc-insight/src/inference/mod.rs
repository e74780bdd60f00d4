//! Insight generation: model inference for text, analytics for tables

mod analytics;
mod ollama;
mod prompt;
mod remote;

pub use analytics::summarize;
pub use ollama::OllamaBackend;
pub use prompt::{build_prompt, template};
pub use remote::RemoteBackend;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{AppConfig, BackendKind, InferenceConfig};
use crate::error::Result;
use crate::types::{InferenceMode, InsightResult, Payload};

/// Text generation service. Shared read-only across requests.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Generate a response to the prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Backend name for logs
    fn name(&self) -> &str;
}

/// Build the configured backend
pub fn build_backend(config: &AppConfig) -> Result<Arc<dyn InferenceBackend>> {
    let backend: Arc<dyn InferenceBackend> = match config.inference.backend {
        BackendKind::Remote => Arc::new(RemoteBackend::new(
            &config.ollama_api_url,
            config.inference.timeout_secs,
        )?),
        BackendKind::Ollama => {
            let ollama = OllamaBackend::new(&config.inference)?;
            tracing::info!("Ollama model: {}", ollama.model());
            Arc::new(ollama)
        }
    };
    tracing::info!("Inference backend: {}", backend.name());
    Ok(backend)
}

/// Turns a cleaned payload into an insight
#[derive(Clone)]
pub struct InsightGenerator {
    backend: Arc<dyn InferenceBackend>,
    prompt_char_limit: usize,
    sample_rows: usize,
}

impl InsightGenerator {
    pub fn new(backend: Arc<dyn InferenceBackend>, prompt_char_limit: usize, sample_rows: usize) -> Self {
        Self {
            backend,
            prompt_char_limit,
            sample_rows,
        }
    }

    /// Generator with limits from the inference settings
    pub fn from_config(backend: Arc<dyn InferenceBackend>, config: &InferenceConfig) -> Self {
        Self::new(backend, config.prompt_char_limit, config.sample_rows)
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Text goes to the backend; tables are summarized without a model call
    pub async fn generate(&self, payload: &Payload, mode: InferenceMode) -> Result<InsightResult> {
        match payload {
            Payload::Text(text) => {
                let prompt = build_prompt(mode, text, self.prompt_char_limit);
                tracing::debug!(
                    "Sending {} character prompt to {} ({} mode)",
                    prompt.chars().count(),
                    self.backend.name(),
                    mode
                );
                let output = self.backend.generate(&prompt).await?;
                Ok(InsightResult::Text(output))
            }
            Payload::Tables(tables) => Ok(InsightResult::Analytics(summarize(tables, self.sample_rows))),
        }
    }
}
