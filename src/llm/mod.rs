// LLM abstraction layer

pub mod cli;
pub mod ollama;
pub mod provider;

pub use cli::OllamaCliAdapter;
pub use ollama::OllamaHttpAdapter;
pub use provider::*;
