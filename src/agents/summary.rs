//! Summary Agent
//!
//! Produces a short summary and key points for a document from its leading chunks.

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::agents::parser::{parse_with_fallback, string_list, Generated, ResponseShape};
use crate::llm::LLM;

/// Chunks included in the summary prompt.
pub const SUMMARY_CONTEXT_CHUNKS: usize = 10;

const FALLBACK_KEY_POINT: &str = "Content analysis failed - please check Ollama connection";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryResult {
    pub summary: String,
    pub key_points: Vec<String>,
    pub word_count: u64,
}

pub struct SummaryShape<'a> {
    chunks: &'a [String],
    max_length: usize,
}

impl<'a> SummaryShape<'a> {
    pub fn new(chunks: &'a [String], max_length: usize) -> Self {
        Self { chunks, max_length }
    }
}

impl ResponseShape for SummaryShape<'_> {
    type Output = SummaryResult;

    fn name(&self) -> &'static str {
        "summary"
    }

    fn validate(&self, value: Value) -> Option<SummaryResult> {
        let object = value.as_object()?;
        let summary = object
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or("Summary generation failed.")
            .trim()
            .to_string();

        Some(SummaryResult {
            summary,
            key_points: string_list(object.get("key_points")),
            word_count: object.get("word_count").and_then(Value::as_u64).unwrap_or(0),
        })
    }

    fn fallback(&self) -> SummaryResult {
        let summary = match self.chunks.first() {
            Some(chunk) => chunk
                .split_whitespace()
                .take(self.max_length / 5)
                .collect::<Vec<_>>()
                .join(" "),
            None => "No content available.".to_string(),
        };
        let word_count = summary.split_whitespace().count() as u64;

        SummaryResult {
            summary,
            key_points: vec![FALLBACK_KEY_POINT.to_string()],
            word_count,
        }
    }
}

pub struct SummaryAgent;

impl SummaryAgent {
    pub fn create_prompt(chunks: &[String], max_length: usize) -> String {
        let context = chunks
            .iter()
            .take(SUMMARY_CONTEXT_CHUNKS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            r#"You are an expert document summarizer. Analyze the following document and provide:

1. A concise summary (maximum {max_length} words)
2. 5-7 key points or main ideas
3. The total word count of your summary

Format your response as valid JSON:
{{
  "summary": "Your summary text here...",
  "key_points": ["Key point 1", "Key point 2", "Key point 3"],
  "word_count": 123
}}

Document content:
{context}

Remember: Return ONLY valid JSON, no additional text before or after."#
        )
    }

    pub async fn summarize(llm: &LLM, chunks: &[String], max_length: usize) -> Generated<SummaryResult> {
        info!(chunks = chunks.len(), max_length, "Generating summary");
        let raw = llm.complete(&Self::create_prompt(chunks, max_length), None).await;
        parse_with_fallback(&raw, &SummaryShape::new(chunks, max_length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::parser::ContentSource;

    #[test]
    fn test_fallback_takes_leading_words() {
        let chunks = vec!["one two three four five".to_string()];
        let result = parse_with_fallback("", &SummaryShape::new(&chunks, 500));

        assert_eq!(result.source, ContentSource::Fallback);
        assert_eq!(result.output.summary, "one two three four five");
        assert_eq!(result.output.word_count, 5);
        assert_eq!(result.output.key_points, vec![FALLBACK_KEY_POINT.to_string()]);
    }

    #[test]
    fn test_fallback_respects_max_length() {
        let chunks = vec!["a b c d e f g h i j k l".to_string()];
        let result = SummaryShape::new(&chunks, 25).fallback();
        assert_eq!(result.summary, "a b c d e");
        assert_eq!(result.word_count, 5);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let chunks = vec!["text".to_string()];
        let result = parse_with_fallback(r#"{"key_points": ["Cells divide", 3]}"#, &SummaryShape::new(&chunks, 500));

        assert_eq!(result.source, ContentSource::Llm);
        assert_eq!(result.output.summary, "Summary generation failed.");
        assert_eq!(result.output.key_points, vec!["Cells divide".to_string()]);
        assert_eq!(result.output.word_count, 0);
    }

    #[test]
    fn test_non_object_json_falls_back() {
        let chunks = vec!["alpha beta".to_string()];
        let result = parse_with_fallback(r#"["not", "an", "object"]"#, &SummaryShape::new(&chunks, 500));
        assert!(result.is_fallback());
        assert_eq!(result.output.summary, "alpha beta");
    }

    #[test]
    fn test_prompt_uses_first_ten_chunks() {
        let chunks: Vec<String> = (0..12).map(|i| format!("chunk-{}", i)).collect();
        let prompt = SummaryAgent::create_prompt(&chunks, 300);

        assert!(prompt.contains("maximum 300 words"));
        assert!(prompt.contains("chunk-9"));
        assert!(!prompt.contains("chunk-10"));
    }
}
