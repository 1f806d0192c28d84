// Ollama HTTP adapter
// API Reference: https://github.com/ollama/ollama/blob/main/docs/api.md#generate-a-completion

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::LLMConfig;
use crate::llm::provider::{LLMAdapter, LLMError};
use crate::types::{LLMRequest, LLMResponse};

pub struct OllamaHttpAdapter {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

impl OllamaHttpAdapter {
    pub fn new(config: &LLMConfig) -> Result<Self, LLMError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| LLMError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl LLMAdapter for OllamaHttpAdapter {
    async fn generate(&self, request: &LLMRequest) -> Result<LLMResponse, LLMError> {
        let url = format!("{}/api/generate", self.base_url);

        let body = GenerateRequest {
            model: &request.model,
            prompt: &request.prompt,
            stream: false,
            options: GenerateOptions {
                temperature: request.temperature,
                top_p: request.top_p,
                num_predict: request.num_predict,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LLMError::Request(format!("Ollama request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LLMError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LLMError::InvalidResponse(format!("Failed to parse Ollama response: {}", e)))?;

        Ok(LLMResponse {
            content: parsed.response,
            provider: "ollama-http".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "ollama-http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn request() -> LLMRequest {
        LLMRequest {
            model: "llama3.1:8b".to_string(),
            prompt: "Summarize photosynthesis".to_string(),
            temperature: 0.7,
            top_p: 0.9,
            num_predict: 2048,
        }
    }

    #[tokio::test]
    async fn test_sends_generate_body_and_reads_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate")
            .match_body(Matcher::Json(serde_json::json!({
                "model": "llama3.1:8b",
                "prompt": "Summarize photosynthesis",
                "stream": false,
                "options": {"temperature": 0.7, "top_p": 0.9, "num_predict": 2048}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"model":"llama3.1:8b","response":"Plants make sugar.","done":true}"#)
            .create_async()
            .await;

        let config = LLMConfig {
            base_url: format!("{}/", server.url()),
            ..LLMConfig::default()
        };
        let adapter = OllamaHttpAdapter::new(&config).unwrap();
        let response = adapter.generate(&request()).await.unwrap();

        assert_eq!(response.content, "Plants make sugar.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(404)
            .with_body(r#"{"error":"model not found"}"#)
            .create_async()
            .await;

        let config = LLMConfig {
            base_url: server.url(),
            ..LLMConfig::default()
        };
        let adapter = OllamaHttpAdapter::new(&config).unwrap();

        assert!(matches!(
            adapter.generate(&request()).await,
            Err(LLMError::Status { status: 404, .. })
        ));
    }
}
