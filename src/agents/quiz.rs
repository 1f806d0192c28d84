//! Quiz Agent
//!
//! Generates multiple-choice questions with exactly four options. The model may
//! name the correct answer by its text or by its letter; both are resolved to
//! the option text and a derived letter label.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::agents::parser::{parse_with_fallback, prefix_chars, string_list, Generated, ResponseShape};
use crate::llm::LLM;

/// Chunks included in the quiz prompt.
pub const QUIZ_CONTEXT_CHUNKS: usize = 8;
pub const OPTIONS_PER_QUESTION: usize = 4;

const LABELS: [char; OPTIONS_PER_QUESTION] = ['A', 'B', 'C', 'D'];
const FALLBACK_SOURCE_CHARS: usize = 300;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizItem {
    pub question: String,
    pub options: Vec<String>,
    /// Literal text of the correct option.
    pub answer: String,
    pub answer_label: String,
    pub explanation: String,
    pub source_chunks: Vec<String>,
}

pub struct QuizShape<'a> {
    chunks: &'a [String],
    num_questions: usize,
}

impl<'a> QuizShape<'a> {
    pub fn new(chunks: &'a [String], num_questions: usize) -> Self {
        Self { chunks, num_questions }
    }
}

/// Index of the option named by `answer`, matched by text or by letter.
fn resolve_answer(answer: &str, options: &[String]) -> Option<usize> {
    let answer = answer.trim();
    if let Some(index) = options.iter().position(|o| o.trim().eq_ignore_ascii_case(answer)) {
        return Some(index);
    }

    // "B", "b)", "(C)", "Option D"
    let letter = answer
        .strip_prefix("Option ")
        .unwrap_or(answer)
        .trim_matches(|c: char| c == '(' || c == ')' || c == '.' || c == ':' || c.is_whitespace());
    let mut chars = letter.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => LABELS.iter().position(|l| *l == c.to_ascii_uppercase()),
        _ => None,
    }
}

fn parse_item(item: &Map<String, Value>) -> Option<QuizItem> {
    let question = item.get("question")?.as_str()?.trim();
    if question.is_empty() {
        return None;
    }

    let mut options = string_list(item.get("options"));
    if options.len() < OPTIONS_PER_QUESTION {
        return None;
    }
    options.truncate(OPTIONS_PER_QUESTION);

    let index = resolve_answer(item.get("answer")?.as_str()?, &options)?;
    let explanation = match item.get("explanation")? {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        _ => return None,
    };

    Some(QuizItem {
        question: question.to_string(),
        answer: options[index].clone(),
        answer_label: LABELS[index].to_string(),
        options,
        explanation,
        source_chunks: string_list(item.get("source_chunks")),
    })
}

impl ResponseShape for QuizShape<'_> {
    type Output = Vec<QuizItem>;

    fn name(&self) -> &'static str {
        "quiz"
    }

    fn validate(&self, value: Value) -> Option<Vec<QuizItem>> {
        let raw_items = match &value {
            Value::Array(items) => items,
            Value::Object(object) => object.get("questions")?.as_array()?,
            _ => return None,
        };

        let items: Vec<QuizItem> = raw_items
            .iter()
            .filter_map(Value::as_object)
            .filter_map(parse_item)
            .take(self.num_questions)
            .collect();

        debug!(received = raw_items.len(), kept = items.len(), "Validated quiz items");
        (!items.is_empty()).then_some(items)
    }

    fn fallback(&self) -> Vec<QuizItem> {
        self.chunks
            .iter()
            .take(self.num_questions)
            .enumerate()
            .map(|(i, chunk)| {
                let options: Vec<String> = LABELS.iter().map(|l| format!("Option {}", l)).collect();
                let source = if chunk.is_empty() {
                    "No content available".to_string()
                } else {
                    prefix_chars(chunk, FALLBACK_SOURCE_CHARS)
                };
                QuizItem {
                    question: format!(
                        "Question {}: Based on the provided material, what is the main point?",
                        i + 1
                    ),
                    answer: options[0].clone(),
                    answer_label: LABELS[0].to_string(),
                    options,
                    explanation: "This is a fallback question. Please ensure Ollama is running for AI-generated questions.".to_string(),
                    source_chunks: vec![source],
                }
            })
            .collect()
    }
}

pub struct QuizAgent;

impl QuizAgent {
    pub fn create_prompt(chunks: &[String], num_questions: usize) -> String {
        let context = chunks
            .iter()
            .take(QUIZ_CONTEXT_CHUNKS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            r#"You are an expert educator creating multiple-choice questions from study materials.

Create {num_questions} high-quality multiple-choice questions based on the provided content.

Requirements:
- Questions should be directly answerable from the given content
- Each question must have exactly 4 options
- The "answer" field must repeat the exact text of the correct option
- Provide clear, unambiguous questions
- Include brief explanations for correct answers
- Avoid external knowledge not present in the content

Format your response as valid JSON:
{{
  "questions": [
    {{
      "question": "What is the main topic discussed in this document?",
      "options": ["First option", "Second option", "Third option", "Fourth option"],
      "answer": "First option",
      "explanation": "The document clearly states...",
      "source_chunks": ["Relevant text snippet from the content"]
    }}
  ]
}}

Content to analyze:
{context}

Return ONLY valid JSON, no additional text."#
        )
    }

    pub async fn generate_quiz(llm: &LLM, chunks: &[String], num_questions: usize) -> Generated<Vec<QuizItem>> {
        info!(chunks = chunks.len(), num_questions, "Generating quiz");
        let raw = llm.complete(&Self::create_prompt(chunks, num_questions), None).await;
        parse_with_fallback(&raw, &QuizShape::new(chunks, num_questions))
    }
}
