//! Vector index trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::{IndexEntry, IndexStats, SearchHit, SimilarityMetric};
use crate::domain::embedding::Embedding;
use crate::domain::ingestion::{Chunk, ChunkId, DocumentId};
use crate::domain::DomainError;

/// Shared store of chunk embeddings supporting nearest-neighbour search.
///
/// All entries share one dimensionality, fixed by the first insert. Chunk ids are
/// unique; inserting an id that is already present is a no-op. Entries are only
/// removed by `clear`.
#[async_trait]
pub trait VectorIndex: Send + Sync + Debug {
    /// Insert one entry. Returns `false` if the chunk id was already present.
    async fn insert(&self, entry: IndexEntry) -> Result<bool, DomainError>;

    /// Insert entries atomically: either every new entry becomes visible to searches
    /// at once, or none does. Returns the number of entries actually added.
    async fn insert_batch(&self, entries: Vec<IndexEntry>) -> Result<usize, DomainError>;

    /// Up to `k` hits ordered by descending score; ties go to the earliest insert
    async fn search(&self, query: &Embedding, k: usize) -> Result<Vec<SearchHit>, DomainError>;

    /// Like `search`, with each hit resolved to its chunk under the same read snapshot
    async fn search_chunks(
        &self,
        query: &Embedding,
        k: usize,
    ) -> Result<Vec<(Chunk, f32)>, DomainError>;

    /// Look up a stored chunk
    async fn get_chunk(&self, id: &ChunkId) -> Option<Chunk>;

    /// Number of stored entries
    async fn size(&self) -> usize;

    /// Drop every entry; the dimension is forgotten as well
    async fn clear(&self);

    /// Dimension of stored vectors, `None` while empty
    async fn dimension(&self) -> Option<usize>;

    /// Number of chunks stored for a document
    async fn document_chunk_count(&self, document_id: &DocumentId) -> usize;

    /// The first `limit` chunks in insertion order, without their vectors
    async fn preview(&self, limit: usize) -> Vec<Chunk>;

    /// All entries in insertion order
    async fn entries(&self) -> Vec<IndexEntry>;

    async fn stats(&self) -> IndexStats;

    fn metric(&self) -> SimilarityMetric;

    async fn is_empty(&self) -> bool {
        self.size().await == 0
    }
}
