// Document processor: turns an uploaded file into one plain-text blob

use std::path::{Path, PathBuf};

use tracing::info;

use crate::extractors::{DocxExtractor, PdfExtractor, PptxExtractor};
use crate::types::{AppError, AppResult, DocumentType};

pub struct DocumentProcessor;

impl DocumentProcessor {
    /// Extract trimmed text from a PDF, DOCX or PPTX file.
    ///
    /// An empty string is a valid result; callers decide whether that is an error.
    pub fn extract_text(path: &Path) -> AppResult<String> {
        let doc_type = DocumentType::from_path(&path.to_string_lossy())?;

        let text = match doc_type {
            DocumentType::Pdf => PdfExtractor::extract(path),
            DocumentType::Docx => DocxExtractor::extract(path),
            DocumentType::Pptx => PptxExtractor::extract(path),
        }
        .map_err(|e| AppError::Upstream(format!("Error processing document: {}", e)))?;

        let text = text.trim().to_string();
        info!(
            path = %path.display(),
            doc_type = %doc_type,
            chars = text.chars().count(),
            "Text extracted"
        );
        Ok(text)
    }

    /// Same as [`extract_text`](Self::extract_text), run on the blocking pool.
    pub async fn process_document(path: PathBuf) -> AppResult<String> {
        tokio::task::spawn_blocking(move || Self::extract_text(&path))
            .await
            .map_err(|e| AppError::Upstream(format!("Extraction task failed: {}", e)))?
    }
}
