use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::LLMConfig;
use crate::llm::cli::OllamaCliAdapter;
use crate::llm::ollama::OllamaHttpAdapter;
use crate::types::{LLMRequest, LLMResponse};

#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("command failed: {0}")]
    Command(String),
    #[error("timed out after {0}s")]
    Timeout(u64),
}

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn generate(&self, request: &LLMRequest) -> Result<LLMResponse, LLMError>;
    fn name(&self) -> &'static str;
}

/// Local model client. Adapters are tried in order; the first success wins.
pub struct LLM {
    adapters: Vec<Box<dyn LLMAdapter>>,
    config: LLMConfig,
}

impl LLM {
    /// HTTP server first, then the CLI.
    pub fn new(config: LLMConfig) -> Self {
        let mut adapters: Vec<Box<dyn LLMAdapter>> = Vec::new();
        match OllamaHttpAdapter::new(&config) {
            Ok(adapter) => adapters.push(Box::new(adapter)),
            Err(e) => warn!(error = %e, "HTTP adapter unavailable, using CLI only"),
        }
        adapters.push(Box::new(OllamaCliAdapter::new(&config)));
        Self::with_adapters(config, adapters)
    }

    pub fn with_adapters(config: LLMConfig, adapters: Vec<Box<dyn LLMAdapter>>) -> Self {
        Self { adapters, config }
    }

    pub fn default_model(&self) -> &str {
        &self.config.model
    }

    /// Generated text, or an empty string when every adapter fails.
    pub async fn complete(&self, prompt: &str, model: Option<&str>) -> String {
        let request = LLMRequest {
            model: model.unwrap_or(&self.config.model).to_string(),
            prompt: prompt.to_string(),
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            num_predict: self.config.num_predict,
        };

        for adapter in &self.adapters {
            match adapter.generate(&request).await {
                Ok(response) => {
                    info!(
                        provider = %response.provider,
                        model = %request.model,
                        chars = response.content.len(),
                        "LLM generation succeeded"
                    );
                    return response.content;
                }
                Err(e) => {
                    warn!(adapter = adapter.name(), error = %e, "LLM adapter failed");
                }
            }
        }

        warn!(model = %request.model, "All LLM adapters failed, returning empty text");
        String::new()
    }
}
