use serde::{Deserialize, Serialize};

use crate::domain::embedding::{cosine_similarity, dot_product, normalize, Embedding};
use crate::domain::ingestion::{Chunk, ChunkId};

/// Similarity function, fixed per index instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    /// Cosine similarity; stored vectors are normalised at insert
    #[default]
    Cosine,
    /// Raw dot product
    InnerProduct,
}

impl SimilarityMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cosine => "cosine",
            Self::InnerProduct => "inner_product",
        }
    }

    /// Bring a vector into the form it is stored and compared in
    pub fn prepare(&self, vector: &mut [f32]) {
        if *self == Self::Cosine {
            normalize(vector);
        }
    }

    /// Score two vectors that both went through `prepare`
    pub fn score_prepared(&self, a: &[f32], b: &[f32]) -> f32 {
        dot_product(a, b)
    }

    /// Score two arbitrary vectors
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::Cosine => cosine_similarity(a, b),
            Self::InnerProduct => dot_product(a, b),
        }
    }
}

impl std::str::FromStr for SimilarityMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cosine" => Ok(Self::Cosine),
            "inner_product" | "ip" | "dot" => Ok(Self::InnerProduct),
            other => Err(format!("unknown similarity metric '{}'", other)),
        }
    }
}

/// A chunk together with its embedding, as stored by a `VectorIndex`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub embedding: Embedding,
}

impl IndexEntry {
    pub fn new(chunk: Chunk, embedding: Embedding) -> Self {
        Self { chunk, embedding }
    }

    pub fn chunk_id(&self) -> &ChunkId {
        &self.chunk.id
    }

    pub fn dimensions(&self) -> usize {
        self.embedding.dimensions()
    }
}

/// One search result; the chunk is resolved separately
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub chunk_id: ChunkId,
    pub score: f32,
}

impl SearchHit {
    pub fn new(chunk_id: ChunkId, score: f32) -> Self {
        Self { chunk_id, score }
    }
}

/// Snapshot of index bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub entries: usize,
    pub documents: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<usize>,
    pub metric: SimilarityMetric,
    /// Whether searches currently go through the approximate graph
    pub approximate: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_prepare_normalizes() {
        let mut v = vec![3.0, 4.0];
        SimilarityMetric::Cosine.prepare(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);

        let mut v = vec![3.0, 4.0];
        SimilarityMetric::InnerProduct.prepare(&mut v);
        assert_eq!(v, vec![3.0, 4.0]);
    }

    #[test]
    fn test_score() {
        assert!((SimilarityMetric::Cosine.score(&[2.0, 0.0], &[5.0, 0.0]) - 1.0).abs() < 1e-6);
        assert_eq!(SimilarityMetric::InnerProduct.score(&[2.0, 0.0], &[5.0, 0.0]), 10.0);
    }

    #[test]
    fn test_metric_parsing() {
        assert_eq!("cosine".parse::<SimilarityMetric>(), Ok(SimilarityMetric::Cosine));
        assert_eq!(
            "inner_product".parse::<SimilarityMetric>(),
            Ok(SimilarityMetric::InnerProduct)
        );
        assert!("euclid".parse::<SimilarityMetric>().is_err());
        assert_eq!(
            serde_json::to_string(&SimilarityMetric::InnerProduct).unwrap(),
            "\"inner_product\""
        );
    }
}
