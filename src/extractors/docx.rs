// DOCX extractor
//
// A DOCX file is a zip package; body text lives in word/document.xml as
// <w:p> paragraphs made of <w:t> runs.

use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::{read_zip_entry, ExtractError};

pub struct DocxExtractor;

impl DocxExtractor {
    /// All paragraph texts of the document body, newline-joined.
    pub fn extract(path: &Path) -> Result<String, ExtractError> {
        let xml = read_zip_entry(path, "word/document.xml")?;
        Ok(Self::paragraphs(&xml)?.join("\n"))
    }

    fn paragraphs(xml: &str) -> Result<Vec<String>, ExtractError> {
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();
        let mut paragraphs = Vec::new();
        let mut current = String::new();
        let mut in_text = false;
        // tab and break elements also appear as tab-stop and layout
        // definitions under <w:pPr>; only run-level ones are text
        let mut in_run = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match e.name().as_ref() {
                    b"w:t" => in_text = true,
                    b"w:r" => in_run = true,
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                    b"w:tab" if in_run => current.push('\t'),
                    b"w:br" | b"w:cr" if in_run => current.push('\n'),
                    b"w:p" => paragraphs.push(String::new()),
                    _ => {}
                },
                Ok(Event::End(ref e)) => match e.name().as_ref() {
                    b"w:t" => in_text = false,
                    b"w:r" => in_run = false,
                    b"w:p" => paragraphs.push(std::mem::take(&mut current)),
                    _ => {}
                },
                Ok(Event::Text(e)) if in_text => {
                    let text = e.unescape().map_err(|e| ExtractError::Xml(e.to_string()))?;
                    current.push_str(&text);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(ExtractError::Xml(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(paragraphs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::fixtures::write_package;
    use tempfile::TempDir;

    const DOCUMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Cell biology</w:t></w:r></w:p>
    <w:p><w:r><w:t xml:space="preserve">Mitochondria are the </w:t></w:r><w:r><w:t>powerhouse &amp; more.</w:t></w:r></w:p>
    <w:p/>
    <w:p><w:r><w:t>Ribosomes</w:t><w:tab/><w:t>make proteins.</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    #[test]
    fn test_paragraphs_join_runs() {
        let paragraphs = DocxExtractor::paragraphs(DOCUMENT_XML).unwrap();
        assert_eq!(
            paragraphs,
            vec![
                "Cell biology".to_string(),
                "Mitochondria are the powerhouse & more.".to_string(),
                String::new(),
                "Ribosomes\tmake proteins.".to_string(),
            ]
        );
    }

    #[test]
    fn test_tab_stop_definitions_are_not_text() {
        let xml = r#"<w:document xmlns:w="w"><w:body><w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>Heading</w:t></w:r></w:p><w:p><w:pPr><w:tabs><w:tab w:val="right" w:pos="9000"/></w:tabs></w:pPr><w:r><w:t>Name</w:t><w:tab/><w:t>Score</w:t></w:r></w:p></w:body></w:document>"#;

        let paragraphs = DocxExtractor::paragraphs(xml).unwrap();
        assert_eq!(paragraphs, vec!["Heading".to_string(), "Name\tScore".to_string()]);
    }

    #[test]
    fn test_extract_from_package() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.docx");
        write_package(&path, &[("word/document.xml", DOCUMENT_XML)]);

        let text = DocxExtractor::extract(&path).unwrap();
        assert!(text.starts_with("Cell biology\nMitochondria are the powerhouse & more."));
    }

    #[test]
    fn test_missing_document_part_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.docx");
        write_package(&path, &[("word/styles.xml", "<w:styles/>")]);

        assert!(matches!(DocxExtractor::extract(&path), Err(ExtractError::Archive(_))));
    }
}
