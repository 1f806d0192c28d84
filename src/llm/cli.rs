// Ollama CLI adapter: `<binary> run <model> <prompt>`

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;

use crate::config::LLMConfig;
use crate::llm::provider::{LLMAdapter, LLMError};
use crate::types::{LLMRequest, LLMResponse};

pub struct OllamaCliAdapter {
    binary: String,
    timeout_secs: u64,
}

impl OllamaCliAdapter {
    pub fn new(config: &LLMConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            timeout_secs: config.cli_timeout_secs,
        }
    }
}

#[async_trait]
impl LLMAdapter for OllamaCliAdapter {
    async fn generate(&self, request: &LLMRequest) -> Result<LLMResponse, LLMError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("run")
            .arg(&request.model)
            .arg(&request.prompt)
            .kill_on_drop(true);

        let output = timeout(Duration::from_secs(self.timeout_secs), cmd.output())
            .await
            .map_err(|_| LLMError::Timeout(self.timeout_secs))?
            .map_err(|e| LLMError::Command(format!("{}: {}", self.binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LLMError::Command(format!(
                "exit code {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        Ok(LLMResponse {
            content: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            provider: "ollama-cli".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "ollama-cli"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> LLMRequest {
        LLMRequest {
            model: "llama3.1:8b".to_string(),
            prompt: "hello".to_string(),
            temperature: 0.7,
            top_p: 0.9,
            num_predict: 16,
        }
    }

    #[tokio::test]
    async fn test_missing_binary_is_an_error() {
        let adapter = OllamaCliAdapter::new(&LLMConfig {
            binary: "smartdocs-missing-ollama-binary".to_string(),
            ..LLMConfig::default()
        });

        assert!(matches!(
            adapter.generate(&request()).await,
            Err(LLMError::Command(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_stdout() {
        // `echo run <model> <prompt>` stands in for the real binary
        let adapter = OllamaCliAdapter::new(&LLMConfig {
            binary: "echo".to_string(),
            ..LLMConfig::default()
        });

        let response = adapter.generate(&request()).await.unwrap();
        assert_eq!(response.content, "run llama3.1:8b hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_an_error() {
        let adapter = OllamaCliAdapter::new(&LLMConfig {
            binary: "false".to_string(),
            ..LLMConfig::default()
        });

        assert!(adapter.generate(&request()).await.is_err());
    }
}
