//! Document pipeline
//!
//! Every flow shares one skeleton:
//!
//! ```text
//! file_id ─▶ metadata ─▶ extract ─▶ chunk ─▶ (retrieve) ─▶ prompt ─▶ LLM ─▶ parse / fallback
//! ```
//!
//! Missing documents and documents without text are rejected before any
//! generation is attempted. Generation problems never fail a request; they
//! degrade to fallback content.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::agents::answer::AnswerAgent;
use crate::agents::question_bank::QuestionBankAgent;
use crate::agents::quiz::QuizAgent;
use crate::agents::summary::SummaryAgent;
use crate::db::MetadataStore;
use crate::embeddings::{chunk_text, DocumentProcessor, ScoredChunk, VectorSearch};
use crate::llm::LLM;
use crate::models::{
    AskResponse, FileMeta, QuestionBankResponse, QuizResponse, SummarizeResponse,
};
use crate::types::{AppError, AppResult};

pub const DEFAULT_TOP_K: usize = 6;
pub const MAX_TOP_K: usize = 20;
pub const MAX_QUESTIONS: usize = 50;

pub struct DocumentPipeline {
    store: Arc<dyn MetadataStore>,
    llm: Arc<LLM>,
    search: VectorSearch,
}

impl DocumentPipeline {
    pub fn new(store: Arc<dyn MetadataStore>, llm: Arc<LLM>, search: VectorSearch) -> Self {
        Self { store, llm, search }
    }

    async fn resolve(&self, file_id: &str) -> AppResult<(FileMeta, PathBuf)> {
        let meta = self
            .store
            .get(file_id)
            .await?
            .ok_or_else(|| AppError::DocumentNotFound("File not found".to_string()))?;

        let path = PathBuf::from(&meta.filepath);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(AppError::DocumentNotFound("File not found on disk".to_string()));
        }
        Ok((meta, path))
    }

    /// Resolve, extract and chunk a document.
    pub async fn load_chunks(&self, file_id: &str) -> AppResult<Vec<String>> {
        let (meta, path) = self.resolve(file_id).await?;

        let text = DocumentProcessor::process_document(path).await?;
        if text.trim().is_empty() {
            return Err(AppError::EmptyContent(
                "Document contains no extractable text".to_string(),
            ));
        }

        let chunks = chunk_text(&text);
        if chunks.is_empty() {
            return Err(AppError::EmptyContent("Could not process document text".to_string()));
        }

        info!(
            file_id = %file_id,
            filename = %meta.filename,
            chunks = chunks.len(),
            "Document chunked"
        );
        Ok(chunks)
    }

    pub async fn summarize(&self, file_id: &str, max_length: usize) -> AppResult<SummarizeResponse> {
        if max_length == 0 {
            return Err(AppError::InvalidRequest("max_length must be positive".to_string()));
        }

        let chunks = self.load_chunks(file_id).await?;
        let generated = SummaryAgent::summarize(&self.llm, &chunks, max_length).await;
        if generated.is_fallback() {
            warn!(file_id = %file_id, "Summary served from fallback content");
        }

        Ok(SummarizeResponse {
            file_id: file_id.to_string(),
            summary: generated.output.summary,
            key_points: generated.output.key_points,
            word_count: generated.output.word_count,
        })
    }

    pub async fn generate_quiz(&self, file_id: &str, num_questions: usize) -> AppResult<QuizResponse> {
        check_question_count(num_questions)?;

        let chunks = self.load_chunks(file_id).await?;
        let generated = QuizAgent::generate_quiz(&self.llm, &chunks, num_questions).await;
        if generated.is_fallback() {
            warn!(file_id = %file_id, "Quiz served from fallback content");
        }

        Ok(QuizResponse {
            file_id: file_id.to_string(),
            num_questions: generated.output.len(),
            questions: generated.output,
        })
    }

    pub async fn generate_question_bank(
        &self,
        file_id: &str,
        num_questions: usize,
    ) -> AppResult<QuestionBankResponse> {
        check_question_count(num_questions)?;

        let chunks = self.load_chunks(file_id).await?;
        let generated = QuestionBankAgent::generate_questions(&self.llm, &chunks, num_questions).await;
        if generated.is_fallback() {
            warn!(file_id = %file_id, "Question bank served from fallback content");
        }

        Ok(QuestionBankResponse {
            file_id: file_id.to_string(),
            num_questions: generated.output.len(),
            questions: generated.output,
        })
    }

    pub async fn answer_question(
        &self,
        file_id: &str,
        question: &str,
        top_k: Option<usize>,
    ) -> AppResult<AskResponse> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::InvalidRequest("question must not be empty".to_string()));
        }
        let k = top_k.unwrap_or(DEFAULT_TOP_K).clamp(1, MAX_TOP_K);

        let chunks = self.load_chunks(file_id).await?;
        let sources = match self.search.retrieve(&chunks, question, k).await {
            Ok(sources) => sources,
            Err(e) => {
                warn!(error = %e, "Retrieval failed, using leading chunks as context");
                chunks
                    .iter()
                    .take(k)
                    .map(|text| ScoredChunk {
                        text: text.clone(),
                        distance: 1.0,
                    })
                    .collect()
            }
        };

        let generated = AnswerAgent::answer(&self.llm, question, &sources).await;
        if generated.is_fallback() {
            warn!(file_id = %file_id, "Answer served from fallback content");
        }

        Ok(AskResponse {
            file_id: file_id.to_string(),
            question: question.to_string(),
            answer: generated.output,
            sources,
        })
    }
}

fn check_question_count(num_questions: usize) -> AppResult<()> {
    if num_questions == 0 || num_questions > MAX_QUESTIONS {
        return Err(AppError::InvalidRequest(format!(
            "num_questions must be between 1 and {}",
            MAX_QUESTIONS
        )));
    }
    Ok(())
}
