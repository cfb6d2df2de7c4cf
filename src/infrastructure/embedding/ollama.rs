//! Ollama embedding provider (`/api/embed`)

use async_trait::async_trait;
use serde::Deserialize;

use super::{HttpClientTrait, HttpError};
use crate::domain::embedding::{Embedding, EmbeddingProvider};
use crate::domain::DomainError;
use crate::infrastructure::llm::DEFAULT_OLLAMA_BASE_URL;

pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

/// Ollama embedding provider
#[derive(Debug)]
pub struct OllamaEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    base_url: String,
    model: String,
    dimensions: Option<usize>,
}

impl<C: HttpClientTrait> OllamaEmbeddingProvider<C> {
    /// Create a provider against the default local endpoint
    pub fn new(client: C, model: impl Into<String>) -> Self {
        Self::with_base_url(client, model, DEFAULT_OLLAMA_BASE_URL)
    }

    /// Create a new provider with custom base URL
    pub fn with_base_url(client: C, model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            dimensions: None,
        }
    }

    /// Expected vector size; responses of any other size are rejected
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    fn embed_url(&self) -> String {
        format!("{}/api/embed", self.base_url)
    }

    fn parse_response(
        &self,
        json: serde_json::Value,
        expected: usize,
    ) -> Result<Vec<Embedding>, DomainError> {
        let response: OllamaEmbedResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::embedding_unavailable(format!("Failed to parse embedding response: {}", e))
        })?;

        if response.embeddings.len() != expected {
            return Err(DomainError::embedding_unavailable(format!(
                "requested {} embeddings, received {}",
                expected,
                response.embeddings.len()
            )));
        }

        if let Some(dimensions) = self.dimensions {
            if let Some(bad) = response.embeddings.iter().find(|v| v.len() != dimensions) {
                return Err(DomainError::dimension_mismatch(dimensions, bad.len()));
            }
        }

        Ok(response.embeddings.into_iter().map(Embedding::new).collect())
    }
}

fn embedding_error(err: HttpError) -> DomainError {
    match err {
        HttpError::Status { status: 404, body } => {
            DomainError::embedding_unavailable(format!("embedding model not found: {}", body))
        }
        other => DomainError::embedding_unavailable(format!("ollama: {}", other)),
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for OllamaEmbeddingProvider<C> {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = serde_json::json!({
            "model": self.model,
            "input": texts,
        });

        let response = self
            .client
            .post_json(&self.embed_url(), &body)
            .await
            .map_err(embedding_error)?;

        self.parse_response(response, texts.len())
    }

    fn provider_name(&self) -> &'static str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }
}

// Ollama API types for embeddings

#[derive(Debug, Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;

    const TEST_URL: &str = "http://localhost:11434/api/embed";

    #[tokio::test]
    async fn test_ollama_embed_batch() {
        let client = MockHttpClient::new().with_response(
            TEST_URL,
            serde_json::json!({
                "model": "nomic-embed-text",
                "embeddings": [[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]]
            }),
        );
        let provider = OllamaEmbeddingProvider::new(client, "nomic-embed-text");

        let texts = vec!["first".to_string(), "second".to_string()];
        let embeddings = provider.embed_batch(&texts).await.unwrap();

        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[1].vector(), &[0.4, 0.5, 0.6]);

        let requests = provider.client.requests();
        assert_eq!(
            requests[0].1,
            serde_json::json!({ "model": "nomic-embed-text", "input": ["first", "second"] })
        );
    }

    #[tokio::test]
    async fn test_empty_batch_skips_request() {
        let provider = OllamaEmbeddingProvider::new(MockHttpClient::new(), "nomic-embed-text");

        let embeddings = provider.embed_batch(&[]).await.unwrap();

        assert!(embeddings.is_empty());
        assert!(provider.client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_count_mismatch_is_unavailable() {
        let client = MockHttpClient::new()
            .with_response(TEST_URL, serde_json::json!({ "embeddings": [[0.1, 0.2]] }));
        let provider = OllamaEmbeddingProvider::new(client, "nomic-embed-text");

        let texts = vec!["a".to_string(), "b".to_string()];
        let result = provider.embed_batch(&texts).await;

        assert!(matches!(
            result,
            Err(DomainError::EmbeddingUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_dimension_check() {
        let client = MockHttpClient::new()
            .with_response(TEST_URL, serde_json::json!({ "embeddings": [[0.1, 0.2]] }));
        let provider =
            OllamaEmbeddingProvider::new(client, "nomic-embed-text").with_dimensions(768);

        let result = provider.embed("a").await;

        assert!(matches!(
            result,
            Err(DomainError::DimensionMismatch {
                expected: 768,
                got: 2
            })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let client = MockHttpClient::new().with_error(TEST_URL, HttpError::Timeout);
        let provider = OllamaEmbeddingProvider::new(client, "nomic-embed-text");

        let result = provider.embed("a").await;

        assert!(matches!(
            result,
            Err(DomainError::EmbeddingUnavailable { .. })
        ));
    }
}
