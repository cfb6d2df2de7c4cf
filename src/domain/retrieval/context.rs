use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::ingestion::Chunk;
use crate::domain::DomainError;

/// A chunk selected for a query, with its similarity score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub chunk: Chunk,
    pub score: f32,
}

impl RetrievedChunk {
    pub fn new(chunk: Chunk, score: f32) -> Self {
        Self { chunk, score }
    }
}

/// Chunks relevant to a query, ordered by descending score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievedContext {
    chunks: Vec<RetrievedChunk>,
}

impl RetrievedContext {
    /// Build a context; input is re-sorted by descending score (stable for ties)
    pub fn new(mut chunks: Vec<RetrievedChunk>) -> Self {
        chunks.sort_by(|a, b| b.score.total_cmp(&a.score));
        Self { chunks }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn chunks(&self) -> &[RetrievedChunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Drop chunks scoring below `floor`
    pub fn with_floor(self, floor: Option<f32>) -> Self {
        match floor {
            Some(floor) => Self {
                chunks: self
                    .chunks
                    .into_iter()
                    .filter(|c| c.score >= floor)
                    .collect(),
            },
            None => self,
        }
    }
}

impl IntoIterator for RetrievedContext {
    type Item = RetrievedChunk;
    type IntoIter = std::vec::IntoIter<RetrievedChunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.into_iter()
    }
}

/// Finds the chunks most relevant to a question
#[async_trait]
pub trait Retriever: Send + Sync + Debug {
    /// Top `k` chunks for `query`. An empty index yields an empty context, not an error.
    async fn retrieve(&self, query: &str, k: usize) -> Result<RetrievedContext, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ingestion::{ChunkId, DocumentId};

    fn chunk(doc: &str, ordinal: usize) -> Chunk {
        let document_id = DocumentId::new(doc);
        Chunk {
            id: ChunkId::for_document(&document_id, ordinal),
            document_id,
            filename: format!("{}.pdf", doc),
            ordinal,
            content: format!("chunk {}", ordinal),
            pages: vec![1],
            char_start: 0,
            char_end: 7,
        }
    }

    #[test]
    fn test_context_sorted_by_score() {
        let context = RetrievedContext::new(vec![
            RetrievedChunk::new(chunk("a", 0), 0.2),
            RetrievedChunk::new(chunk("a", 1), 0.9),
            RetrievedChunk::new(chunk("b", 0), 0.5),
        ]);

        let scores: Vec<f32> = context.chunks().iter().map(|c| c.score).collect();
        assert_eq!(scores, vec![0.9, 0.5, 0.2]);
        let documents: Vec<&str> = context
            .chunks()
            .iter()
            .map(|c| c.chunk.document_id.as_str())
            .collect();
        assert_eq!(documents, vec!["a", "b", "a"]);
    }

    #[test]
    fn test_floor_filters_low_scores() {
        let context = RetrievedContext::new(vec![
            RetrievedChunk::new(chunk("a", 0), 0.2),
            RetrievedChunk::new(chunk("a", 1), 0.9),
        ]);

        assert_eq!(context.clone().with_floor(None).len(), 2);
        let floored = context.with_floor(Some(0.5));
        assert_eq!(floored.len(), 1);
        assert_eq!(floored.chunks()[0].chunk.ordinal, 1);
    }
}
