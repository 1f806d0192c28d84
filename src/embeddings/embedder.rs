// Embedding models used to rank chunks against a query

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{EmbeddingsConfig, LLMConfig};

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedderError>;
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbedderError>;
    fn name(&self) -> &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum EmbedderError {
    #[error("embedding request failed: {0}")]
    RequestFailed(String),
    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),
    #[error("embedding task failed: {0}")]
    TaskFailed(String),
    #[error("unknown embeddings provider: {0}")]
    UnknownProvider(String),
}

/// Local feature-hashing embedder.
///
/// Lowercased alphanumeric tokens are hashed (FNV-1a) into a fixed number of
/// signed buckets. Needs no model download and is fully deterministic.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = fnv1a(token.to_lowercase().as_bytes());
            let index = (hash % self.dimensions as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[index] += sign;
        }
        vector
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        let embedder = self.clone();
        let texts = texts.to_vec();
        tokio::task::spawn_blocking(move || texts.iter().map(|t| embedder.embed(t)).collect::<Vec<_>>())
            .await
            .map_err(|e| EmbedderError::TaskFailed(e.to_string()))
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        Ok(self.embed(text))
    }

    fn name(&self) -> &'static str {
        "hashing"
    }
}

/// Embeddings served by the local Ollama server (`POST /api/embeddings`).
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbedder {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, EmbedderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmbedderError::RequestFailed(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        let url = format!("{}/api/embeddings", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&OllamaEmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| EmbedderError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbedderError::RequestFailed(format!("HTTP {}: {}", status, body)));
        }

        let parsed: OllamaEmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbedderError::InvalidResponse(e.to_string()))?;
        if parsed.embedding.is_empty() {
            return Err(EmbedderError::InvalidResponse("empty embedding".to_string()));
        }
        Ok(parsed.embedding)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed_one(text).await?);
        }
        Ok(vectors)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        self.embed_one(text).await
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}

pub struct EmbedderFactory;

impl EmbedderFactory {
    pub fn create(
        config: &EmbeddingsConfig,
        llm: &LLMConfig,
    ) -> Result<Arc<dyn Embedder>, EmbedderError> {
        match config.provider.as_str() {
            "hashing" => {
                info!(dimensions = config.dimensions, "Using local hashing embedder");
                Ok(Arc::new(HashingEmbedder::new(config.dimensions)))
            }
            "ollama" => {
                info!(model = %config.model, "Using Ollama embedding model");
                let embedder = OllamaEmbedder::new(
                    &llm.base_url,
                    &config.model,
                    Duration::from_secs(llm.http_timeout_secs),
                )?;
                Ok(Arc::new(embedder))
            }
            other => Err(EmbedderError::UnknownProvider(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashing_is_deterministic_and_case_insensitive() {
        let embedder = HashingEmbedder::new(64);
        assert_eq!(embedder.embed("Cell Membrane"), embedder.embed("cell membrane"));
        assert_eq!(embedder.embed("cell membrane").len(), 64);
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(16);
        assert!(embedder.embed("  ... ").iter().all(|v| *v == 0.0));
    }

    #[tokio::test]
    async fn test_ollama_embedder_reads_embedding() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/embeddings")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "all-minilm",
                "prompt": "osmosis"
            })))
            .with_status(200)
            .with_body(r#"{"embedding":[0.5,0.25]}"#)
            .create_async()
            .await;

        let embedder = OllamaEmbedder::new(&server.url(), "all-minilm", Duration::from_secs(5)).unwrap();
        let vector = embedder.embed_query("osmosis").await.unwrap();

        assert_eq!(vector, vec![0.5, 0.25]);
        mock.assert_async().await;
    }

    #[test]
    fn test_factory_rejects_unknown_provider() {
        let config = EmbeddingsConfig {
            provider: "word2vec".to_string(),
            ..EmbeddingsConfig::default()
        };
        assert!(matches!(
            EmbedderFactory::create(&config, &LLMConfig::default()),
            Err(EmbedderError::UnknownProvider(_))
        ));
    }
}
