//! Offline embedder based on feature hashing
//!
//! Each lowercase alphanumeric token, and each pair of adjacent tokens, is hashed
//! (FNV-1a) into one of `dimensions` buckets with a hash-derived sign. The result is
//! L2-normalised. No model download is needed, which makes it useful for tests and
//! air-gapped setups; retrieval quality is lexical rather than semantic.

use async_trait::async_trait;

use crate::domain::embedding::{normalize, Embedding, EmbeddingProvider};
use crate::domain::DomainError;

pub const DEFAULT_HASHING_DIMENSIONS: usize = 384;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

#[derive(Debug, Clone)]
pub struct HashingEmbeddingProvider {
    dimensions: usize,
    model: String,
}

impl HashingEmbeddingProvider {
    pub fn new(dimensions: usize) -> Result<Self, DomainError> {
        if dimensions == 0 {
            return Err(DomainError::configuration(
                "hashing embedder needs at least one dimension",
            ));
        }

        Ok(Self {
            dimensions,
            model: format!("hashing-{}", dimensions),
        })
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let tokens: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect();

        let mut vector = vec![0.0f32; self.dimensions];

        for token in &tokens {
            self.add_feature(&mut vector, token.as_bytes(), 1.0);
        }

        for pair in tokens.windows(2) {
            let joined = format!("{} {}", pair[0], pair[1]);
            self.add_feature(&mut vector, joined.as_bytes(), 0.5);
        }

        normalize(&mut vector);
        vector
    }

    fn add_feature(&self, vector: &mut [f32], feature: &[u8], weight: f32) {
        let hash = fnv1a(feature);
        let bucket = (hash % self.dimensions as u64) as usize;
        let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME)
    })
}

#[async_trait]
impl EmbeddingProvider for HashingEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, DomainError> {
        Ok(texts
            .iter()
            .map(|text| Embedding::new(self.vectorize(text)))
            .collect())
    }

    fn provider_name(&self) -> &'static str {
        "hashing"
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
    use crate::domain::embedding::{cosine_similarity, l2_norm};

    #[test]
    fn test_fnv1a_known_value() {
        assert_eq!(fnv1a(b""), FNV_OFFSET);
        assert_eq!(fnv1a(b"a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[tokio::test]
    async fn test_deterministic_and_normalised() {
        let provider = HashingEmbeddingProvider::new(128).unwrap();

        let a = provider.embed("The pump runs at 40 bar").await.unwrap();
        let b = provider.embed("The pump runs at 40 bar").await.unwrap();

        assert_eq!(a, b);
        assert_eq!(a.dimensions(), 128);
        assert!((l2_norm(a.vector()) - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_case_and_punctuation_insensitive() {
        let provider = HashingEmbeddingProvider::new(64).unwrap();

        let a = provider.embed("Hello, World!").await.unwrap();
        let b = provider.embed("hello world").await.unwrap();

        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_overlapping_text_scores_higher() {
        let provider = HashingEmbeddingProvider::new(DEFAULT_HASHING_DIMENSIONS).unwrap();
        let texts = vec![
            "maintenance interval for the hydraulic pump".to_string(),
            "pump maintenance interval".to_string(),
            "quarterly revenue grew in europe".to_string(),
        ];

        let vectors = provider.embed_batch(&texts).await.unwrap();
        let related = cosine_similarity(vectors[0].vector(), vectors[1].vector());
        let unrelated = cosine_similarity(vectors[0].vector(), vectors[2].vector());

        assert!(related > unrelated);
        assert_eq!(provider.model_name(), "hashing-384");
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let provider = HashingEmbeddingProvider::new(16).unwrap();
        let e = provider.embed("  ").await.unwrap();
        assert!(e.vector().iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(HashingEmbeddingProvider::new(0).is_err());
    }
}
