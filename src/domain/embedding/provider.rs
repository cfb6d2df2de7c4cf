//! Embedding provider trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use super::Embedding;
use crate::domain::DomainError;

/// Trait for embedding backends (Ollama, local hashing, etc.)
///
/// Implementations must be deterministic: the same model and text always produce the
/// same vector. Any failure to reach the backend is reported as `EmbeddingUnavailable`.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Embed a batch of texts, preserving order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, DomainError>;

    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::embedding_unavailable("backend returned no embedding"))
    }

    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Model identity, recorded in index checkpoints
    fn model_name(&self) -> &str;

    /// Vector dimensions, when known up front
    fn dimensions(&self) -> Option<usize>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic bag-of-words embedder: each lowercase word adds weight to one
    /// bucket, so texts sharing words score higher under cosine similarity.
    #[derive(Debug)]
    pub struct MockEmbeddingProvider {
        dimensions: usize,
        model: String,
        error: Option<String>,
        calls: AtomicUsize,
    }

    impl MockEmbeddingProvider {
        pub fn new(dimensions: usize) -> Self {
            Self {
                dimensions,
                model: String::from("mock-embedding"),
                error: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_model(mut self, model: impl Into<String>) -> Self {
            self.model = model.into();
            self
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        /// Number of `embed_batch` calls made so far
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn vector_for(&self, text: &str) -> Vec<f32> {
            let mut vector = vec![0.0; self.dimensions];
            for word in text
                .split(|c: char| !c.is_alphanumeric())
                .filter(|w| !w.is_empty())
            {
                let hash = word
                    .to_lowercase()
                    .bytes()
                    .fold(17u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
                vector[(hash % self.dimensions as u64) as usize] += 1.0;
            }
            if vector.iter().all(|x| *x == 0.0) {
                vector[0] = 1.0;
            }
            vector
        }
    }

    #[async_trait]
    impl EmbeddingProvider for MockEmbeddingProvider {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(ref error) = self.error {
                return Err(DomainError::embedding_unavailable(error));
            }

            Ok(texts
                .iter()
                .map(|text| Embedding::new(self.vector_for(text)))
                .collect())
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }

        fn model_name(&self) -> &str {
            &self.model
        }

        fn dimensions(&self) -> Option<usize> {
            Some(self.dimensions)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_provider_batch_preserves_order() {
            let provider = MockEmbeddingProvider::new(64);
            let texts = vec!["alpha".to_string(), "beta".to_string()];

            let embeddings = provider.embed_batch(&texts).await.unwrap();

            assert_eq!(embeddings.len(), 2);
            assert_eq!(embeddings[0].vector(), provider.vector_for("alpha"));
            assert_eq!(embeddings[1].vector(), provider.vector_for("beta"));
        }

        #[tokio::test]
        async fn test_mock_provider_error() {
            let provider = MockEmbeddingProvider::new(8).with_error("connection refused");

            let result = provider.embed("hello").await;

            assert!(matches!(
                result,
                Err(DomainError::EmbeddingUnavailable { .. })
            ));
            assert_eq!(provider.calls(), 1);
        }

        #[tokio::test]
        async fn test_deterministic_embeddings() {
            let provider = MockEmbeddingProvider::new(128);

            let first = provider.embed("Hello world").await.unwrap();
            let second = provider.embed("Hello world").await.unwrap();

            assert_eq!(first, second);
            assert_eq!(first.dimensions(), 128);
        }
    }
}
