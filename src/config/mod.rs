//! Layered application configuration

mod app_config;

pub use app_config::{
    AppConfig, ChunkingSection, EmbeddingBackend, EmbeddingSection, IngestionSection,
    LlmSection, LogFormat, LoggingConfig, PromptSection, QuerySection, RetrievalSection,
    ServerConfig,
};
