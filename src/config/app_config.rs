use std::time::Duration;

use serde::Deserialize;

use crate::domain::ingestion::{ChunkingConfig, IngestionConfig};
use crate::domain::query::{GenerationOptions, QueryConfig};
use crate::domain::DomainError;
use crate::infrastructure::embedding::{
    EmbeddingProviderConfig, DEFAULT_EMBEDDING_MODEL, DEFAULT_HASHING_DIMENSIONS,
};
use crate::infrastructure::index::IndexConfig;
use crate::infrastructure::llm::{LlmProviderConfig, DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL};
use crate::infrastructure::observability::MetricsConfig;

/// Application configuration; every section has defaults, so an empty source is valid
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
    pub embedding: EmbeddingSection,
    pub llm: LlmSection,
    pub chunking: ChunkingSection,
    pub index: IndexConfig,
    pub retrieval: RetrievalSection,
    pub prompt: PromptSection,
    pub ingestion: IngestionSection,
    pub query: QuerySection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on a whole multipart upload
    pub max_upload_bytes: usize,
    /// Text returned by `GET /greet`
    pub greeting: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    #[default]
    Ollama,
    /// Local feature hashing; needs no model server
    Hashing,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingSection {
    pub provider: EmbeddingBackend,
    pub base_url: String,
    pub model: String,
    pub dimensions: Option<usize>,
    pub timeout_secs: u64,
    /// Chunks per embedding request
    pub batch_size: usize,
    /// Embedding requests in flight per document
    pub concurrency: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub top_k: u32,
    pub timeout_secs: u64,
    pub retry_once: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChunkingSection {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalSection {
    pub top_k: usize,
    pub relevance_floor: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromptSection {
    pub max_length: usize,
    pub max_history_turns: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestionSection {
    pub parse_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuerySection {
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_upload_bytes: 100 * 1024 * 1024,
            greeting: "Hello! Upload PDF documents and ask me questions about them.".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for EmbeddingSection {
    fn default() -> Self {
        let ingestion = IngestionConfig::default();
        Self {
            provider: EmbeddingBackend::default(),
            base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: None,
            timeout_secs: 60,
            batch_size: ingestion.batch_size,
            concurrency: ingestion.concurrency,
        }
    }
}

impl Default for LlmSection {
    fn default() -> Self {
        let generation = GenerationOptions::default();
        Self {
            base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            temperature: generation.temperature,
            max_tokens: generation.max_tokens,
            top_p: generation.top_p,
            top_k: generation.top_k,
            timeout_secs: 120,
            retry_once: true,
        }
    }
}

impl Default for ChunkingSection {
    fn default() -> Self {
        let chunking = ChunkingConfig::default();
        Self {
            chunk_size: chunking.chunk_size,
            chunk_overlap: chunking.chunk_overlap,
        }
    }
}

impl Default for RetrievalSection {
    fn default() -> Self {
        Self {
            top_k: 6,
            relevance_floor: None,
        }
    }
}

impl Default for PromptSection {
    fn default() -> Self {
        Self {
            max_length: 12_000,
            max_history_turns: 8,
        }
    }
}

impl Default for IngestionSection {
    fn default() -> Self {
        Self {
            parse_timeout_secs: 60,
        }
    }
}

impl Default for QuerySection {
    fn default() -> Self {
        Self { timeout_secs: 300 }
    }
}

impl AppConfig {
    /// `config/default.*`, then `config/local.*`, then `APP__SECTION__KEY` variables
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Parse a TOML document on top of the defaults
    pub fn from_toml(source: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.ingestion_config().validate()?;
        self.query_config().validate()?;
        self.index.validate()?;

        if self.embedding.timeout_secs == 0 || self.llm.timeout_secs == 0 {
            return Err(DomainError::configuration("timeouts must be greater than 0"));
        }

        Ok(())
    }

    pub fn embedding_provider_config(&self) -> EmbeddingProviderConfig {
        match self.embedding.provider {
            EmbeddingBackend::Ollama => EmbeddingProviderConfig::Ollama {
                base_url: self.embedding.base_url.clone(),
                model: self.embedding.model.clone(),
                dimensions: self.embedding.dimensions,
            },
            EmbeddingBackend::Hashing => EmbeddingProviderConfig::Hashing {
                dimensions: self.embedding.dimensions.unwrap_or(DEFAULT_HASHING_DIMENSIONS),
            },
        }
    }

    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_secs(self.embedding.timeout_secs)
    }

    pub fn llm_provider_config(&self) -> LlmProviderConfig {
        LlmProviderConfig::Ollama {
            base_url: self.llm.base_url.clone(),
            model: self.llm.model.clone(),
        }
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.timeout_secs)
    }

    pub fn ingestion_config(&self) -> IngestionConfig {
        IngestionConfig::new()
            .with_chunk_size(self.chunking.chunk_size)
            .with_chunk_overlap(self.chunking.chunk_overlap)
            .with_batch_size(self.embedding.batch_size)
            .with_concurrency(self.embedding.concurrency)
            .with_parse_timeout_secs(self.ingestion.parse_timeout_secs)
    }

    pub fn query_config(&self) -> QueryConfig {
        let mut config = QueryConfig::new()
            .with_top_k(self.retrieval.top_k)
            .with_max_prompt_length(self.prompt.max_length)
            .with_generation_timeout_secs(self.llm.timeout_secs)
            .with_retry_once(self.llm.retry_once)
            .with_timeout_secs(self.query.timeout_secs);

        config.relevance_floor = self.retrieval.relevance_floor;
        config.max_history_turns = self.prompt.max_history_turns;
        config.generation = GenerationOptions {
            temperature: self.llm.temperature,
            max_tokens: self.llm.max_tokens,
            top_p: self.llm.top_p,
            top_k: self.llm.top_k,
        };
        config
    }
}
