// Type definitions and the application error taxonomy

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Document formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Pdf,
    Docx,
    Pptx,
}

impl DocumentType {
    /// Parse an extension such as `"PDF"` or `"docx"`.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentType::Pdf),
            "docx" => Some(DocumentType::Docx),
            "pptx" => Some(DocumentType::Pptx),
            _ => None,
        }
    }

    /// Detect the type from the text after the last dot of the final path segment.
    pub fn from_path(path: &str) -> AppResult<Self> {
        let ext = extension_of(path);
        Self::from_extension(&ext).ok_or(AppError::UnsupportedFormat(ext))
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentType::Pdf => write!(f, "pdf"),
            DocumentType::Docx => write!(f, "docx"),
            DocumentType::Pptx => write!(f, "pptx"),
        }
    }
}

/// Lowercased extension of the final path segment, empty when there is no dot.
pub fn extension_of(path: &str) -> String {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    pub top_p: f32,
    pub num_predict: u32,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMResponse {
    pub content: String,
    pub provider: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unsupported file type: {0}. Supported types are: pdf, docx, pptx")]
    UnsupportedFormat(String),

    #[error("{0}")]
    EmptyContent(String),

    #[error("{0}")]
    DocumentNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Upstream(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::UnsupportedFormat(_)
            | AppError::EmptyContent(_)
            | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::DocumentNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Io(_) | AppError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::info!(error = %self, status = status.as_u16(), "Request rejected");
        }
        let body = serde_json::json!({ "detail": self.to_string() });
        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_taken_from_final_segment() {
        assert_eq!(extension_of("uploads/notes.v2/Lecture.PDF"), "pdf");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("uploads.d/README"), "");
    }

    #[test]
    fn test_document_type_from_path() {
        assert_eq!(DocumentType::from_path("a/b/slides.PPTX").unwrap(), DocumentType::Pptx);
        assert_eq!(DocumentType::from_path("paper.pdf").unwrap(), DocumentType::Pdf);
        assert!(matches!(
            DocumentType::from_path("notes.txt"),
            Err(AppError::UnsupportedFormat(ext)) if ext == "txt"
        ));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::UnsupportedFormat("odt".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::EmptyContent("empty".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::DocumentNotFound("gone".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Upstream("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
