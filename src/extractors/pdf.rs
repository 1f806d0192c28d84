// PDF extractor
//
// Primary path reads page by page with lopdf. Any failure, on any page,
// discards the partial result and re-reads the whole document with
// pdf-extract.

use std::path::Path;

use tracing::{debug, warn};

use super::ExtractError;

pub struct PdfExtractor;

impl PdfExtractor {
    pub fn extract(path: &Path) -> Result<String, ExtractError> {
        Self::extract_with(path, Self::extract_pages, Self::extract_whole)
    }

    fn extract_with<P, F>(path: &Path, primary: P, fallback: F) -> Result<String, ExtractError>
    where
        P: FnOnce(&Path) -> Result<String, ExtractError>,
        F: FnOnce(&Path) -> Result<String, ExtractError>,
    {
        match primary(path) {
            Ok(text) => Ok(text),
            Err(primary) => {
                warn!(
                    path = %path.display(),
                    error = %primary,
                    "Page-by-page PDF extraction failed, falling back to whole-document parser"
                );
                fallback(path).map_err(|secondary| {
                    ExtractError::Pdf(format!("{}; fallback: {}", primary, secondary))
                })
            }
        }
    }

    /// Page texts in page order, each followed by a newline.
    fn extract_pages(path: &Path) -> Result<String, ExtractError> {
        let doc = lopdf::Document::load(path)
            .map_err(|e| ExtractError::Pdf(format!("failed to load PDF: {}", e)))?;

        let pages = doc.get_pages();
        debug!(page_count = pages.len(), "Extracting PDF pages");

        let mut text = String::new();
        for page_number in pages.keys() {
            let page_text = doc.extract_text(&[*page_number]).map_err(|e| {
                ExtractError::Pdf(format!("failed to extract page {}: {}", page_number, e))
            })?;
            text.push_str(&page_text);
            text.push('\n');
        }
        Ok(text)
    }

    fn extract_whole(path: &Path) -> Result<String, ExtractError> {
        let bytes = std::fs::read(path).map_err(|source| ExtractError::Open {
            path: path.display().to_string(),
            source,
        })?;
        let text = pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| ExtractError::Pdf(format!("pdf-extract failed: {}", e)))?;

        // pdf-extract separates pages with form feeds
        Ok(text
            .split('\u{c}')
            .map(|page| page.trim_end())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
