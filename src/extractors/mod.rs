// Format-specific text readers

pub mod docx;
pub mod pdf;
pub mod pptx;

pub use docx::DocxExtractor;
pub use pdf::PdfExtractor;
pub use pptx::PptxExtractor;

use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid archive: {0}")]
    Archive(String),

    #[error("XML parsing error: {0}")]
    Xml(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),
}

/// Read one entry of an Office Open XML package as UTF-8.
pub(crate) fn read_zip_entry(path: &Path, entry: &str) -> Result<String, ExtractError> {
    let mut archive = open_archive(path)?;
    let mut file = archive
        .by_name(entry)
        .map_err(|e| ExtractError::Archive(format!("{} not found: {}", entry, e)))?;
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| ExtractError::Archive(format!("failed to read {}: {}", entry, e)))?;
    Ok(content)
}

pub(crate) fn open_archive(path: &Path) -> Result<zip::ZipArchive<File>, ExtractError> {
    let file = File::open(path).map_err(|source| ExtractError::Open {
        path: path.display().to_string(),
        source,
    })?;
    zip::ZipArchive::new(file).map_err(|e| ExtractError::Archive(e.to_string()))
}
