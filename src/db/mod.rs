// File metadata storage

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::models::FileMeta;
use crate::types::AppResult;

pub mod memory;
pub mod pool;
pub mod postgres;

pub use memory::MemoryStore;
pub use pool::*;
pub use postgres::PostgresStore;

#[async_trait]
pub trait MetadataStore: Send + Sync {
    fn name(&self) -> &'static str;

    async fn get(&self, file_id: &str) -> AppResult<Option<FileMeta>>;

    /// A user's files, newest upload first.
    async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<FileMeta>>;

    async fn upsert(&self, meta: FileMeta) -> AppResult<()>;

    /// Returns whether a record was removed.
    async fn delete(&self, file_id: &str) -> AppResult<bool>;

    async fn find_by_user_and_filename(&self, user_id: &str, filename: &str) -> AppResult<Vec<FileMeta>>;

    async fn close(&self) {}
}

/// Build the store named by `config.provider`.
///
/// An unreachable Postgres server is not fatal: the service keeps running on
/// the in-memory store and says so in the log.
pub async fn create_store(config: &DatabaseConfig) -> Result<Arc<dyn MetadataStore>> {
    match config.provider.as_str() {
        "memory" => {
            info!("Using in-memory metadata store");
            Ok(Arc::new(MemoryStore::new()))
        }
        "postgres" => {
            let url = config
                .url
                .as_deref()
                .context("DATABASE_URL is required when STORE_PROVIDER=postgres")?;
            match create_pool(url, config).await {
                Ok(pool) => {
                    let store = PostgresStore::new(pool);
                    store.migrate().await?;
                    info!("Using Postgres metadata store");
                    Ok(Arc::new(store))
                }
                Err(e) => {
                    warn!(error = %e, "Postgres unavailable, falling back to in-memory metadata store");
                    Ok(Arc::new(MemoryStore::new()))
                }
            }
        }
        other => anyhow::bail!("Unknown STORE_PROVIDER: {}", other),
    }
}
