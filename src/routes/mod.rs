//! API Routes
//!
//! - `/health` - Health check
//! - `/upload`, `/files`, `/delete-file` - Document upload and management
//! - `/summarize` - Document summary
//! - `/quiz` - Multiple-choice quiz
//! - `/questionbank` (alias `/question-bank`) - Open questions
//! - `/ask` - Question answering over retrieved chunks

pub mod ask;
pub mod files;
pub mod health;
pub mod quiz;
pub mod summarize;

use axum::Router;
use tracing::info;

use crate::middleware::apply_middleware;
use crate::models::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let server_config = state.config.server.clone();
    let router = Router::new()
        .merge(health::router(state.clone()))
        .merge(files::router(state.clone()))
        .merge(summarize::router(state.clone()))
        .merge(quiz::router(state.clone()))
        .merge(ask::router(state));

    apply_middleware(router, &server_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::DocumentPipeline;
    use crate::config::{Config, LLMConfig};
    use crate::db::{MemoryStore, MetadataStore};
    use crate::models::FileMeta;
    use crate::types::{AppError, AppResult};
    use async_trait::async_trait;
    use crate::embeddings::{HashingEmbedder, VectorSearch};
    use crate::llm::LLM;
    use crate::storage::LocalStorage;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_state(dir: &TempDir) -> AppState {
        let mut config = Config::default();
        config.storage.upload_dir = dir.path().join("uploads");

        let store: Arc<dyn MetadataStore> = Arc::new(MemoryStore::new());
        // no adapters: every generation degrades to fallback content
        let llm = Arc::new(LLM::with_adapters(LLMConfig::default(), Vec::new()));
        let search = VectorSearch::new(Arc::new(HashingEmbedder::new(384)));

        AppState {
            storage: LocalStorage::new(&config.storage),
            pipeline: Arc::new(DocumentPipeline::new(store.clone(), llm, search)),
            store,
            config,
        }
    }

    /// Store whose writes always fail.
    struct ReadOnlyStore;

    #[async_trait]
    impl MetadataStore for ReadOnlyStore {
        fn name(&self) -> &'static str {
            "read-only"
        }

        async fn get(&self, _file_id: &str) -> AppResult<Option<FileMeta>> {
            Ok(None)
        }

        async fn list_by_user(&self, _user_id: &str) -> AppResult<Vec<FileMeta>> {
            Ok(Vec::new())
        }

        async fn upsert(&self, _meta: FileMeta) -> AppResult<()> {
            Err(AppError::Upstream("metadata store is read-only".to_string()))
        }

        async fn delete(&self, _file_id: &str) -> AppResult<bool> {
            Ok(false)
        }

        async fn find_by_user_and_filename(&self, _user_id: &str, _filename: &str) -> AppResult<Vec<FileMeta>> {
            Ok(Vec::new())
        }
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_upload(uri: &str, filename: &str, content: &[u8]) -> Request<Body> {
        let boundary = "smartdocs-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = TempDir::new().unwrap();
        let app = create_router(test_state(&dir));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["store"], "memory");
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_type() {
        let dir = TempDir::new().unwrap();
        let app = create_router(test_state(&dir));

        let response = app
            .oneshot(multipart_upload("/upload?user_id=alice", "notes.txt", b"hello"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(
            body["detail"],
            "Unsupported file type: txt. Supported types are: pdf, docx, pptx"
        );
    }

    #[tokio::test]
    async fn test_upload_list_and_delete() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        let app = create_router(state.clone());

        let response = app
            .clone()
            .oneshot(multipart_upload("/upload?user_id=alice", "deck.pptx", b"not really a deck"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let uploaded = json_body(response).await;
        assert_eq!(uploaded["filename"], "deck.pptx");
        assert_eq!(uploaded["filetype"], "pptx");
        assert!(uploaded["file_id"].as_str().is_some());

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/files?user_id=alice").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let files = json_body(response).await;
        assert_eq!(files.as_array().unwrap().len(), 1);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/delete-file?user_id=alice")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"filename": "deck.pptx"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(state.store.list_by_user("alice").await.unwrap().is_empty());

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/delete-file?user_id=alice")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#""deck.pptx""#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_failed_metadata_write_removes_stored_file() {
        let dir = TempDir::new().unwrap();
        let mut state = test_state(&dir);
        state.store = Arc::new(ReadOnlyStore);
        let upload_dir = state.storage.upload_dir().to_path_buf();
        let app = create_router(state);

        let response = app
            .oneshot(multipart_upload("/upload?user_id=alice", "notes.pdf", b"%PDF-1.5 stub"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let leftovers = std::fs::read_dir(&upload_dir)
            .map(|entries| entries.count())
            .unwrap_or(0);
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_generation_routes_report_missing_documents() {
        let dir = TempDir::new().unwrap();
        let app = create_router(test_state(&dir));

        for (uri, body) in [
            ("/summarize", serde_json::json!({"file_id": "nope"})),
            ("/quiz", serde_json::json!({"file_id": "nope", "num_questions": 3})),
            ("/questionbank", serde_json::json!({"file_id": "nope"})),
            ("/question-bank", serde_json::json!({"file_id": "nope"})),
            ("/ask", serde_json::json!({"file_id": "nope", "question": "Why?"})),
        ] {
            let response = app.clone().oneshot(post_json(uri, body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
            assert_eq!(json_body(response).await["detail"], "File not found");
        }
    }

    #[tokio::test]
    async fn test_undecodable_document_is_a_server_error() {
        let dir = TempDir::new().unwrap();
        let app = create_router(test_state(&dir));

        let response = app
            .clone()
            .oneshot(multipart_upload("/upload?user_id=alice", "broken.docx", b"not a zip archive"))
            .await
            .unwrap();
        let file_id = json_body(response).await["file_id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(post_json("/summarize", serde_json::json!({"file_id": file_id})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json_body(response).await["detail"]
            .as_str()
            .unwrap()
            .starts_with("Error processing document"));
    }
}
