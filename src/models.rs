use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agents::{DocumentPipeline, QuizItem};
use crate::config::Config;
use crate::db::MetadataStore;
use crate::embeddings::ScoredChunk;
use crate::storage::LocalStorage;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn MetadataStore>,
    pub storage: LocalStorage,
    pub pipeline: Arc<DocumentPipeline>,
}

// FromRow is needed for runtime query_as (without DATABASE_URL at compile time)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FileMeta {
    pub file_id: String,
    pub user_id: String,
    pub filename: String,
    pub filepath: String,
    pub filetype: String,
    pub upload_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

/// Accepts `{"filename": "..."}` or a bare JSON string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DeleteFileRequest {
    Object { filename: String },
    Name(String),
}

impl DeleteFileRequest {
    pub fn filename(&self) -> &str {
        match self {
            DeleteFileRequest::Object { filename } | DeleteFileRequest::Name(filename) => filename,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailResponse {
    pub detail: String,
}

fn default_max_length() -> usize {
    500
}

fn default_num_questions() -> usize {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummarizeRequest {
    pub file_id: String,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub file_id: String,
    pub summary: String,
    pub key_points: Vec<String>,
    pub word_count: u64,
}

/// Shared by the quiz and question bank endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct QuizRequest {
    pub file_id: String,
    #[serde(default = "default_num_questions")]
    pub num_questions: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizResponse {
    pub file_id: String,
    pub num_questions: usize,
    pub questions: Vec<QuizItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBankResponse {
    pub file_id: String,
    pub num_questions: usize,
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
    pub file_id: String,
    pub question: String,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    pub file_id: String,
    pub question: String,
    pub answer: String,
    pub sources: Vec<ScoredChunk>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub store: String,
}
