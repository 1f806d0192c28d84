use anyhow::Result;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
    pub llm: LLMConfig,
    pub embeddings: EmbeddingsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
    pub log_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub max_upload_mb: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// "memory" or "postgres"
    pub provider: String,
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LLMConfig {
    pub base_url: String,
    pub model: String,
    pub binary: String,
    pub http_timeout_secs: u64,
    pub cli_timeout_secs: u64,
    pub temperature: f32,
    pub top_p: f32,
    pub num_predict: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsConfig {
    /// "ollama", or "hashing" for offline use
    pub provider: String,
    pub model: String,
    pub dimensions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "0.0.0.0".to_string(),
            cors_allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:5174".to_string(),
                "http://127.0.0.1:5173".to_string(),
                "http://127.0.0.1:5174".to_string(),
            ],
            log_dir: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            max_upload_mb: 25,
        }
    }
}

impl StorageConfig {
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            provider: "memory".to_string(),
            url: None,
            max_connections: 10,
            min_connections: 1,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            model: "llama3.1:8b".to_string(),
            binary: "ollama".to_string(),
            http_timeout_secs: 120,
            cli_timeout_secs: 180,
            temperature: 0.7,
            top_p: 0.9,
            num_predict: 2048,
        }
    }
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "all-minilm".to_string(),
            dimensions: 384,
        }
    }
}

fn var_or(key: &str, default: String) -> String {
    env::var(key).ok().filter(|v| !v.trim().is_empty()).unwrap_or(default)
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e)),
        _ => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        Ok(Self {
            server: ServerConfig {
                port: parse_or("PORT", defaults.server.port)?,
                host: var_or("HOST", defaults.server.host),
                cors_allowed_origins: match env::var("ALLOWED_ORIGINS") {
                    Ok(raw) if !raw.trim().is_empty() => raw
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect(),
                    _ => defaults.server.cors_allowed_origins,
                },
                log_dir: env::var("LOG_DIR").ok().filter(|v| !v.trim().is_empty()),
            },
            storage: StorageConfig {
                upload_dir: env::var("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.upload_dir),
                max_upload_mb: parse_or("MAX_UPLOAD_MB", defaults.storage.max_upload_mb)?,
            },
            database: DatabaseConfig {
                provider: var_or("STORE_PROVIDER", defaults.database.provider).to_lowercase(),
                url: env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty()),
                max_connections: parse_or("DB_MAX_CONNECTIONS", defaults.database.max_connections)?,
                min_connections: parse_or("DB_MIN_CONNECTIONS", defaults.database.min_connections)?,
            },
            llm: LLMConfig {
                base_url: var_or("OLLAMA_URL", defaults.llm.base_url),
                model: var_or("OLLAMA_MODEL", defaults.llm.model),
                binary: var_or("OLLAMA_BINARY", defaults.llm.binary),
                http_timeout_secs: parse_or("LLM_HTTP_TIMEOUT_SECS", defaults.llm.http_timeout_secs)?,
                cli_timeout_secs: parse_or("LLM_CLI_TIMEOUT_SECS", defaults.llm.cli_timeout_secs)?,
                temperature: parse_or("LLM_TEMPERATURE", defaults.llm.temperature)?,
                top_p: parse_or("LLM_TOP_P", defaults.llm.top_p)?,
                num_predict: parse_or("LLM_NUM_PREDICT", defaults.llm.num_predict)?,
            },
            embeddings: EmbeddingsConfig {
                provider: var_or("EMBEDDINGS_PROVIDER", defaults.embeddings.provider).to_lowercase(),
                model: var_or("EMBEDDINGS_MODEL", defaults.embeddings.model),
                dimensions: parse_or("EMBEDDINGS_DIMENSIONS", defaults.embeddings.dimensions)?,
            },
        })
    }
}
