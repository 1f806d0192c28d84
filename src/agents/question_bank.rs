//! Question Bank Agent
//!
//! Open questions only: no options, no answers.

use serde_json::Value;
use tracing::info;

use crate::agents::parser::{parse_with_fallback, Generated, ResponseShape};
use crate::llm::LLM;

/// Chunks included in the question bank prompt.
pub const QUESTION_BANK_CONTEXT_CHUNKS: usize = 8;

const FALLBACK_OPENING_WORDS: usize = 8;

pub struct QuestionBankShape<'a> {
    chunks: &'a [String],
    num_questions: usize,
}

impl<'a> QuestionBankShape<'a> {
    pub fn new(chunks: &'a [String], num_questions: usize) -> Self {
        Self { chunks, num_questions }
    }
}

/// Drop list markers such as `1.`, `2)`, `-`, `*` and `Q3:`.
fn strip_numbering(line: &str) -> &str {
    let line = line.trim();
    let line = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .unwrap_or(line);
    let without_q = line
        .strip_prefix('Q')
        .filter(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
        .unwrap_or(line);
    let rest = without_q.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == without_q.len() {
        return line;
    }
    rest.trim_start_matches(['.', ')', ':']).trim_start()
}

impl ResponseShape for QuestionBankShape<'_> {
    type Output = Vec<String>;

    fn name(&self) -> &'static str {
        "question_bank"
    }

    fn validate(&self, value: Value) -> Option<Vec<String>> {
        let items = match &value {
            Value::Array(items) => items,
            Value::Object(object) => object.get("questions")?.as_array()?,
            _ => return None,
        };

        let questions: Vec<String> = items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.as_str()),
                Value::Object(o) => o.get("question").and_then(Value::as_str),
                _ => None,
            })
            .map(|q| strip_numbering(q).to_string())
            .filter(|q| !q.is_empty())
            .take(self.num_questions)
            .collect();

        (!questions.is_empty()).then_some(questions)
    }

    fn salvage(&self, text: &str) -> Option<Vec<String>> {
        let questions: Vec<String> = text
            .lines()
            .map(strip_numbering)
            .filter(|line| line.ends_with('?'))
            .map(str::to_string)
            .take(self.num_questions)
            .collect();

        (!questions.is_empty()).then_some(questions)
    }

    fn fallback(&self) -> Vec<String> {
        self.chunks
            .iter()
            .take(self.num_questions)
            .map(|chunk| {
                let opening: Vec<&str> = chunk.split_whitespace().take(FALLBACK_OPENING_WORDS).collect();
                format!(
                    "What is the main point of the passage beginning \"{}...\"?",
                    opening.join(" ")
                )
            })
            .collect()
    }
}

pub struct QuestionBankAgent;

impl QuestionBankAgent {
    pub fn create_prompt(chunks: &[String], num_questions: usize) -> String {
        let context = chunks
            .iter()
            .take(QUESTION_BANK_CONTEXT_CHUNKS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            r#"Generate {num_questions} clear and concise questions based on the following content.
Do NOT include answers or multiple-choice options.

Format your response as valid JSON:
{{
  "questions": ["First question?", "Second question?"]
}}

Content:
{context}

Return ONLY valid JSON, no additional text."#
        )
    }

    pub async fn generate_questions(llm: &LLM, chunks: &[String], num_questions: usize) -> Generated<Vec<String>> {
        info!(chunks = chunks.len(), num_questions, "Generating question bank");
        let raw = llm.complete(&Self::create_prompt(chunks, num_questions), None).await;
        parse_with_fallback(&raw, &QuestionBankShape::new(chunks, num_questions))
    }
}
