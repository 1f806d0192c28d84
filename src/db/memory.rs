use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::MetadataStore;
use crate::models::FileMeta;
use crate::types::AppResult;

/// Process-local store for development and tests. Contents are lost on restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, FileMeta>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetadataStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, file_id: &str) -> AppResult<Option<FileMeta>> {
        Ok(self.inner.read().await.get(file_id).cloned())
    }

    async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<FileMeta>> {
        let guard = self.inner.read().await;
        let mut files: Vec<FileMeta> = guard.values().filter(|m| m.user_id == user_id).cloned().collect();
        files.sort_by(|a, b| {
            b.upload_date
                .cmp(&a.upload_date)
                .then_with(|| a.file_id.cmp(&b.file_id))
        });
        Ok(files)
    }

    async fn upsert(&self, meta: FileMeta) -> AppResult<()> {
        self.inner.write().await.insert(meta.file_id.clone(), meta);
        Ok(())
    }

    async fn delete(&self, file_id: &str) -> AppResult<bool> {
        Ok(self.inner.write().await.remove(file_id).is_some())
    }

    async fn find_by_user_and_filename(&self, user_id: &str, filename: &str) -> AppResult<Vec<FileMeta>> {
        let guard = self.inner.read().await;
        Ok(guard
            .values()
            .filter(|m| m.user_id == user_id && m.filename == filename)
            .cloned()
            .collect())
    }
}
