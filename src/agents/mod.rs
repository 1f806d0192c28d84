//! Generation agents
//!
//! One agent per flow, each pairing a prompt with a [`parser::ResponseShape`]:
//!
//! - **Summary Agent**: summary, key points and word count
//! - **Quiz Agent**: four-option multiple-choice questions
//! - **Question Bank Agent**: open questions without answers
//! - **Answer Agent**: answers grounded in retrieved chunks
//!
//! [`DocumentPipeline`] runs a document through extraction and chunking and
//! hands the chunks to the right agent.

pub mod answer;
pub mod parser;
pub mod pipeline;
pub mod question_bank;
pub mod quiz;
pub mod summary;

pub use answer::AnswerAgent;
pub use parser::{parse_with_fallback, strip_code_fences, ContentSource, Generated, ResponseShape};
pub use pipeline::DocumentPipeline;
pub use question_bank::QuestionBankAgent;
pub use quiz::{QuizAgent, QuizItem};
pub use summary::{SummaryAgent, SummaryResult};
