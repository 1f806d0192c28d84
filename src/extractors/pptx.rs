// PPTX extractor
//
// Slides live in ppt/slides/slideN.xml. Every <p:sp> shape with a <p:txBody>
// contributes its <a:p> paragraphs, newline-joined.

use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::{open_archive, read_zip_entry, ExtractError};

pub struct PptxExtractor;

#[derive(Default)]
struct ShapeState {
    depth: usize,
    in_body: bool,
    has_body: bool,
    in_text: bool,
    paragraphs: Vec<String>,
    current: String,
}

impl PptxExtractor {
    pub fn extract(path: &Path) -> Result<String, ExtractError> {
        let slides = Self::slide_names(path)?;
        let mut shape_texts = Vec::new();
        for slide in &slides {
            let xml = read_zip_entry(path, slide)?;
            shape_texts.extend(Self::shape_texts(&xml)?);
        }
        Ok(shape_texts.join("\n"))
    }

    /// Slide part names sorted by slide number.
    fn slide_names(path: &Path) -> Result<Vec<String>, ExtractError> {
        let archive = open_archive(path)?;
        let mut slides: Vec<(u32, String)> = archive
            .file_names()
            .filter_map(|name| {
                let number = name
                    .strip_prefix("ppt/slides/slide")?
                    .strip_suffix(".xml")?
                    .parse::<u32>()
                    .ok()?;
                Some((number, name.to_string()))
            })
            .collect();
        slides.sort();
        Ok(slides.into_iter().map(|(_, name)| name).collect())
    }

    fn shape_texts(xml: &str) -> Result<Vec<String>, ExtractError> {
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();
        let mut shapes = Vec::new();
        let mut state = ShapeState::default();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match e.name().as_ref() {
                    b"p:sp" => {
                        if state.depth == 0 {
                            state = ShapeState::default();
                        }
                        state.depth += 1;
                    }
                    b"p:txBody" if state.depth > 0 => {
                        state.in_body = true;
                        state.has_body = true;
                    }
                    b"a:p" if state.in_body => state.current.clear(),
                    b"a:t" if state.in_body => state.in_text = true,
                    b"a:br" if state.in_body => state.current.push('\n'),
                    _ => {}
                },
                Ok(Event::Empty(ref e)) if state.in_body => match e.name().as_ref() {
                    b"a:p" => state.paragraphs.push(String::new()),
                    b"a:br" => state.current.push('\n'),
                    _ => {}
                },
                Ok(Event::End(ref e)) => match e.name().as_ref() {
                    b"a:t" => state.in_text = false,
                    b"a:p" if state.in_body => {
                        let paragraph = std::mem::take(&mut state.current);
                        state.paragraphs.push(paragraph);
                    }
                    b"p:txBody" => state.in_body = false,
                    b"p:sp" if state.depth > 0 => {
                        state.depth -= 1;
                        if state.depth == 0 && state.has_body {
                            shapes.push(state.paragraphs.join("\n"));
                        }
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) if state.in_text => {
                    let text = e.unescape().map_err(|e| ExtractError::Xml(e.to_string()))?;
                    state.current.push_str(&text);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(ExtractError::Xml(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(shapes)
    }
}
