use std::time::Duration;

use serde::Deserialize;

use crate::application::services::{ChatConfig, DEFAULT_REWRITE_TEMPLATE, DEFAULT_SYNTHESIS_TEMPLATE};
use crate::domain::ChunkConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub chunking: ChunkConfig,
    pub retrieval: RetrievalConfig,
    pub history: HistoryConfig,
    pub redis_url: String,
    pub qdrant_url: String,
    pub storage_base_url: String,
    pub ingest_timeout_seconds: u64,
    pub store_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Most recent turns included in prompts; older turns stay persisted.
    pub max_turns: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                allowed_origins: vec!["*".to_string()],
            },
            llm: LlmConfig {
                model: "gpt-4o".to_string(),
                timeout_seconds: 60,
            },
            embedding: EmbeddingConfig {
                model: "text-embedding-3-small".to_string(),
                dimension: 1536,
            },
            chunking: ChunkConfig::default(),
            retrieval: RetrievalConfig {
                top_k: 4,
                timeout_seconds: 15,
            },
            history: HistoryConfig { max_turns: 20 },
            redis_url: "redis://localhost:6379".to_string(),
            qdrant_url: "http://localhost:6334".to_string(),
            storage_base_url: "http://localhost:9000".to_string(),
            ingest_timeout_seconds: 120,
            store_timeout_seconds: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            server: ServerConfig {
                host: env_or("SERVER_HOST", defaults.server.host),
                port: env_parse("SERVER_PORT", defaults.server.port)?,
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                    .unwrap_or(defaults.server.allowed_origins),
            },
            llm: LlmConfig {
                model: env_or("LLM_MODEL", defaults.llm.model),
                timeout_seconds: env_parse("LLM_TIMEOUT_SECONDS", defaults.llm.timeout_seconds)?,
            },
            embedding: EmbeddingConfig {
                model: env_or("EMBEDDING_MODEL", defaults.embedding.model),
                dimension: env_parse("EMBEDDING_DIMENSION", defaults.embedding.dimension)?,
            },
            chunking: ChunkConfig {
                chunk_size: env_parse("CHUNK_SIZE", defaults.chunking.chunk_size)?,
                chunk_overlap: env_parse("CHUNK_OVERLAP", defaults.chunking.chunk_overlap)?,
            },
            retrieval: RetrievalConfig {
                top_k: env_parse("RETRIEVAL_TOP_K", defaults.retrieval.top_k)?,
                timeout_seconds: env_parse(
                    "RETRIEVAL_TIMEOUT_SECONDS",
                    defaults.retrieval.timeout_seconds,
                )?,
            },
            history: HistoryConfig {
                max_turns: env_parse("HISTORY_MAX_TURNS", defaults.history.max_turns)?,
            },
            redis_url: env_or("REDIS_URL", defaults.redis_url),
            qdrant_url: env_or("QDRANT_URL", defaults.qdrant_url),
            storage_base_url: env_or("STORAGE_BASE_URL", defaults.storage_base_url),
            ingest_timeout_seconds: env_parse(
                "INGEST_TIMEOUT_SECONDS",
                defaults.ingest_timeout_seconds,
            )?,
            store_timeout_seconds: env_parse(
                "STORE_TIMEOUT_SECONDS",
                defaults.store_timeout_seconds,
            )?,
        })
    }
}

/// Prompt templates for the rewrite and synthesis stages. Defaults are
/// compiled in; a YAML file pointed at by `PROMPTS_FILE` overrides them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub rewrite_template: String,
    pub synthesis_template: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            rewrite_template: DEFAULT_REWRITE_TEMPLATE.to_string(),
            synthesis_template: DEFAULT_SYNTHESIS_TEMPLATE.to_string(),
        }
    }
}

impl PromptsConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub config: Config,
    pub prompts: PromptsConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Config::from_env()?;
        let prompts = match std::env::var("PROMPTS_FILE") {
            Ok(path) => PromptsConfig::load(&path)?,
            Err(_) => PromptsConfig::default(),
        };
        Ok(Self { config, prompts })
    }

    pub fn chat_config(&self) -> ChatConfig {
        ChatConfig {
            top_k: self.config.retrieval.top_k,
            max_history_turns: self.config.history.max_turns,
            rewrite_template: self.prompts.rewrite_template.clone(),
            synthesis_template: self.prompts.synthesis_template.clone(),
            llm_timeout: Duration::from_secs(self.config.llm.timeout_seconds),
            retrieval_timeout: Duration::from_secs(self.config.retrieval.timeout_seconds),
            store_timeout: Duration::from_secs(self.config.store_timeout_seconds),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: Config::default(),
            prompts: PromptsConfig::default(),
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) => Ok(v.parse()?),
        Err(_) => Ok(default),
    }
}
