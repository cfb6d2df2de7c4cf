//! Embedding provider implementations

mod factory;
mod hashing;
mod ollama;

pub use factory::{EmbeddingProviderConfig, EmbeddingProviderFactory};
pub use hashing::{HashingEmbeddingProvider, DEFAULT_HASHING_DIMENSIONS};
pub use ollama::{OllamaEmbeddingProvider, DEFAULT_EMBEDDING_MODEL};

// Re-export HTTP client for use by embedding providers
pub use super::llm::{HttpClient, HttpClientTrait, HttpError};
