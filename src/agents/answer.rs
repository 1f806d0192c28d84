//! Answer Agent
//!
//! Answers a question from retrieved chunks only.

use serde_json::Value;
use tracing::info;

use crate::agents::parser::{parse_with_fallback, Generated, ResponseShape};
use crate::embeddings::ScoredChunk;
use crate::llm::LLM;

pub const UNAVAILABLE_ANSWER: &str =
    "An answer could not be generated because the language model is unavailable. The most relevant passages from the document are listed in the sources.";

pub struct AnswerShape;

impl ResponseShape for AnswerShape {
    type Output = String;

    fn name(&self) -> &'static str {
        "answer"
    }

    fn validate(&self, value: Value) -> Option<String> {
        let answer = value.get("answer")?.as_str()?.trim();
        (!answer.is_empty()).then(|| answer.to_string())
    }

    fn salvage(&self, text: &str) -> Option<String> {
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    fn fallback(&self) -> String {
        UNAVAILABLE_ANSWER.to_string()
    }
}

pub struct AnswerAgent;

impl AnswerAgent {
    pub fn create_prompt(question: &str, sources: &[ScoredChunk]) -> String {
        let context = sources
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            r#"You are a study assistant. Answer the question using only the document excerpts below.
If the excerpts do not contain the answer, say so.

Format your response as valid JSON:
{{
  "answer": "Your answer here..."
}}

Document excerpts:
{context}

Question: {question}

Return ONLY valid JSON, no additional text."#
        )
    }

    pub async fn answer(llm: &LLM, question: &str, sources: &[ScoredChunk]) -> Generated<String> {
        info!(sources = sources.len(), "Answering question");
        let raw = llm.complete(&Self::create_prompt(question, sources), None).await;
        parse_with_fallback(&raw, &AnswerShape)
    }
}
