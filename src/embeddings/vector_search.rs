// In-memory vector search over one document's chunks
//
// Nothing is indexed or persisted; vectors live for the duration of a call.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::embedder::{Embedder, EmbedderError};

pub struct VectorSearch {
    embedder: Arc<dyn Embedder>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub text: String,
    /// `1 - cosine similarity`; smaller is more relevant.
    pub distance: f32,
}

impl VectorSearch {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    /// The `k` chunks closest to `query`, most relevant first.
    pub async fn retrieve(
        &self,
        chunks: &[String],
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredChunk>, EmbedderError> {
        if chunks.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let chunk_vectors = self.embedder.embed_documents(chunks).await?;
        if chunk_vectors.len() != chunks.len() {
            return Err(EmbedderError::InvalidResponse(format!(
                "expected {} vectors, got {}",
                chunks.len(),
                chunk_vectors.len()
            )));
        }
        let query_vector = self.embedder.embed_query(query).await?;

        let mut scored: Vec<ScoredChunk> = chunks
            .iter()
            .zip(&chunk_vectors)
            .map(|(text, vector)| ScoredChunk {
                text: text.clone(),
                distance: 1.0 - cosine_similarity(&query_vector, vector),
            })
            .collect();

        scored.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);

        debug!(
            embedder = self.embedder.name(),
            candidates = chunks.len(),
            returned = scored.len(),
            "Ranked chunks"
        );
        Ok(scored)
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mut denominator = norm_a * norm_b;
    if denominator == 0.0 {
        denominator = 1.0;
    }
    dot / denominator
}
