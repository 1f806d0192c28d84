// Storage layer: uploaded documents on the local filesystem

use std::fmt::Display;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::types::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub filename: String,
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    upload_dir: PathBuf,
    max_bytes: u64,
}

/// Final path segment of a client-supplied name, so uploads cannot escape the upload dir.
fn base_name(filename: &str) -> Option<&str> {
    filename
        .rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
}

impl LocalStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            upload_dir: config.upload_dir.clone(),
            max_bytes: config.max_upload_bytes(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub async fn ensure_dir(&self) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        Ok(())
    }

    /// Stream an upload to a temp file, enforce the size cap, then move it to
    /// its final name. An existing file of the same name is never overwritten;
    /// the new one gets a UUID suffix instead.
    pub async fn save_stream<S, E>(&self, filename: &str, extension: &str, stream: S) -> AppResult<StoredFile>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Display,
    {
        let name = base_name(filename).ok_or_else(|| AppError::InvalidRequest("No file provided".to_string()))?;
        self.ensure_dir().await?;

        let tmp_path = self.upload_dir.join(format!("tmp_{}.{}", Uuid::new_v4(), extension));
        let size = match self.write_capped(&tmp_path, stream).await {
            Ok(size) => size,
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&tmp_path).await {
                    warn!(path = %tmp_path.display(), error = %remove_err, "Failed to remove temp upload");
                }
                return Err(e);
            }
        };

        let mut final_path = self.upload_dir.join(name);
        if tokio::fs::try_exists(&final_path).await? {
            let original = Path::new(name);
            let stem = original.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
            let suffixed = match original.extension() {
                Some(ext) => format!("{}_{}.{}", stem, Uuid::new_v4(), ext.to_string_lossy()),
                None => format!("{}_{}", stem, Uuid::new_v4()),
            };
            final_path = self.upload_dir.join(suffixed);
        }

        tokio::fs::rename(&tmp_path, &final_path).await?;

        let filename = final_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
        info!(filename = %filename, size, "Upload stored");

        Ok(StoredFile {
            filename,
            path: final_path,
            size,
        })
    }

    async fn write_capped<S, E>(&self, path: &Path, stream: S) -> AppResult<u64>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Display,
    {
        let mut stream = std::pin::pin!(stream);
        let mut file = tokio::fs::File::create(path).await?;
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| AppError::InvalidRequest(format!("Failed to read upload: {}", e)))?;
            written += chunk.len() as u64;
            if written > self.max_bytes {
                return Err(AppError::InvalidRequest(format!(
                    "File exceeds {}MB limit",
                    self.max_bytes / (1024 * 1024)
                )));
            }
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        Ok(written)
    }

    /// Remove an uploaded file by name. `Ok(false)` when it does not exist.
    pub async fn delete(&self, filename: &str) -> AppResult<bool> {
        let Some(name) = base_name(filename) else {
            return Ok(false);
        };
        let path = self.upload_dir.join(name);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(false);
        }
        tokio::fs::remove_file(&path).await?;
        info!(path = %path.display(), "Upload deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage(dir: &TempDir, max_upload_mb: u64) -> LocalStorage {
        LocalStorage::new(&StorageConfig {
            upload_dir: dir.path().join("uploads"),
            max_upload_mb,
        })
    }

    fn body(parts: &[&'static [u8]]) -> impl Stream<Item = Result<Bytes, std::io::Error>> {
        futures::stream::iter(
            parts
                .iter()
                .map(|p| Ok::<_, std::io::Error>(Bytes::from_static(*p)))
                .collect::<Vec<_>>(),
        )
    }

    #[tokio::test]
    async fn test_name_collision_gets_suffix() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir, 25);

        let first = storage.save_stream("notes.pdf", "pdf", body(&[b"one"])).await.unwrap();
        let second = storage.save_stream("notes.pdf", "pdf", body(&[b"two"])).await.unwrap();

        assert_eq!(first.filename, "notes.pdf");
        assert_ne!(second.filename, "notes.pdf");
        assert!(second.filename.starts_with("notes_") && second.filename.ends_with(".pdf"));
        assert_eq!(std::fs::read(&first.path).unwrap(), b"one");
        assert_eq!(std::fs::read(&second.path).unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected_and_removed() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir, 0);

        let result = storage.save_stream("big.pdf", "pdf", body(&[b"x"])).await;

        assert!(matches!(result, Err(AppError::InvalidRequest(msg)) if msg.contains("limit")));
        let leftovers = std::fs::read_dir(storage.upload_dir()).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_path_components_are_stripped() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir, 25);

        let stored = storage.save_stream("../../etc/slides.pptx", "pptx", body(&[b"a", b"b"])).await.unwrap();

        assert_eq!(stored.filename, "slides.pptx");
        assert_eq!(stored.size, 2);
        assert!(stored.path.starts_with(storage.upload_dir()));
    }

    #[tokio::test]
    async fn test_delete() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir, 25);
        storage.save_stream("a.docx", "docx", body(&[b"doc"])).await.unwrap();

        assert!(storage.delete("a.docx").await.unwrap());
        assert!(!storage.delete("a.docx").await.unwrap());
        assert!(!storage.delete("..").await.unwrap());
    }
}
