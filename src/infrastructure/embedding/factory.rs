use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::hashing::{HashingEmbeddingProvider, DEFAULT_HASHING_DIMENSIONS};
use super::ollama::{OllamaEmbeddingProvider, DEFAULT_EMBEDDING_MODEL};
use super::HttpClient;
use crate::domain::{DomainError, EmbeddingProvider};
use crate::infrastructure::llm::DEFAULT_OLLAMA_BASE_URL;

/// Embedding provider configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EmbeddingProviderConfig {
    Ollama {
        #[serde(default = "default_base_url")]
        base_url: String,
        #[serde(default = "default_model")]
        model: String,
        #[serde(default)]
        dimensions: Option<usize>,
    },
    Hashing {
        #[serde(default = "default_hashing_dimensions")]
        dimensions: usize,
    },
}

fn default_base_url() -> String {
    DEFAULT_OLLAMA_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_hashing_dimensions() -> usize {
    DEFAULT_HASHING_DIMENSIONS
}

/// Factory for creating embedding providers
#[derive(Debug)]
pub struct EmbeddingProviderFactory;

impl EmbeddingProviderFactory {
    /// Create an embedding provider from configuration. `timeout` bounds each HTTP call.
    pub fn create(
        config: &EmbeddingProviderConfig,
        timeout: Duration,
    ) -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
        match config {
            EmbeddingProviderConfig::Ollama {
                base_url,
                model,
                dimensions,
            } => {
                if model.trim().is_empty() {
                    return Err(DomainError::configuration(
                        "embedding model cannot be empty",
                    ));
                }

                let mut provider = OllamaEmbeddingProvider::with_base_url(
                    HttpClient::with_timeout(timeout)?,
                    model.clone(),
                    base_url.clone(),
                );
                if let Some(dimensions) = dimensions {
                    provider = provider.with_dimensions(*dimensions);
                }

                Ok(Arc::new(provider))
            }

            EmbeddingProviderConfig::Hashing { dimensions } => {
                Ok(Arc::new(HashingEmbeddingProvider::new(*dimensions)?))
            }
        }
    }
}
