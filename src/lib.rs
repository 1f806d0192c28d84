// SmartDocs - study aids (summaries, quizzes, question banks, answers) from uploaded documents

pub mod agents;
pub mod config;
pub mod db;
pub mod embeddings;
pub mod extractors;
pub mod llm;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod storage;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

use std::sync::Arc;

use tracing::info;

use crate::agents::DocumentPipeline;
use crate::embeddings::{EmbedderFactory, VectorSearch};
use crate::llm::LLM;
use crate::storage::LocalStorage;

/// Wire the store, storage, embedder and model client from configuration.
pub async fn build_state(config: Config) -> anyhow::Result<AppState> {
    let store = db::create_store(&config.database).await?;

    let storage = LocalStorage::new(&config.storage);
    storage.ensure_dir().await?;

    let embedder = EmbedderFactory::create(&config.embeddings, &config.llm)?;
    let llm = Arc::new(LLM::new(config.llm.clone()));
    info!(model = %llm.default_model(), base_url = %config.llm.base_url, "LLM client ready");

    let pipeline = DocumentPipeline::new(store.clone(), llm, VectorSearch::new(embedder));

    Ok(AppState {
        config,
        store,
        storage,
        pipeline: Arc::new(pipeline),
    })
}

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
