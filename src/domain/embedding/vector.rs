//! Embedding vector type and similarity helpers

use serde::{Deserialize, Serialize};

/// A dense vector representation of a text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    /// Create a new embedding
    pub fn new(vector: Vec<f32>) -> Self {
        Self(vector)
    }

    /// Get the embedding vector
    pub fn vector(&self) -> &[f32] {
        &self.0
    }

    /// Get the embedding dimensions
    pub fn dimensions(&self) -> usize {
        self.0.len()
    }

    /// Consume and return the vector
    pub fn into_vector(self) -> Vec<f32> {
        self.0
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(vector: Vec<f32>) -> Self {
        Self(vector)
    }
}

pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Normalize in place to unit length
pub fn normalize(v: &mut [f32]) {
    let norm = l2_norm(v);
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Dot product; mismatched lengths score 0
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Calculate cosine similarity between two vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product(a, b) / (norm_a * norm_b)
}
