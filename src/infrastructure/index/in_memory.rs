//! In-memory vector index
//!
//! Exact scan while small; once the entry count reaches `ann_threshold` an HNSW graph
//! is built and kept up to date, and searches rescore its candidates exactly. Writers
//! hold the lock for a whole batch, so searches never observe a partial insert.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::config::IndexConfig;
use super::hnsw::HnswGraph;
use crate::domain::ingestion::{Chunk, ChunkId, DocumentId};
use crate::domain::{
    DomainError, Embedding, IndexEntry, IndexStats, SearchHit, SimilarityMetric, VectorIndex,
};

#[derive(Debug, Default)]
struct IndexState {
    chunks: Vec<Chunk>,
    /// Prepared vectors, parallel to `chunks`
    vectors: Vec<Vec<f32>>,
    positions: HashMap<ChunkId, usize>,
    documents: HashMap<DocumentId, usize>,
    dimension: Option<usize>,
    graph: Option<HnswGraph>,
}

/// Vector index held entirely in process memory
#[derive(Debug)]
pub struct InMemoryVectorIndex {
    config: IndexConfig,
    state: RwLock<IndexState>,
}

impl InMemoryVectorIndex {
    pub fn new(config: IndexConfig) -> Self {
        Self {
            config,
            state: RwLock::new(IndexState::default()),
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    fn check_dimension(expected: Option<usize>, got: usize) -> Result<(), DomainError> {
        if got == 0 {
            return Err(DomainError::validation("embedding has no dimensions"));
        }

        match expected {
            Some(expected) if expected != got => Err(DomainError::dimension_mismatch(expected, got)),
            _ => Ok(()),
        }
    }

    fn append(&self, state: &mut IndexState, entry: IndexEntry) {
        let IndexEntry { chunk, embedding } = entry;
        let mut vector = embedding.into_vector();
        self.config.metric.prepare(&mut vector);

        let position = state.chunks.len();
        state.dimension.get_or_insert(vector.len());
        state.positions.insert(chunk.id.clone(), position);
        *state.documents.entry(chunk.document_id.clone()).or_insert(0) += 1;
        state.chunks.push(chunk);
        state.vectors.push(vector);

        match state.graph.as_mut() {
            Some(graph) => graph.insert(&state.vectors),
            None if state.vectors.len() >= self.config.ann_threshold => {
                info!(entries = state.vectors.len(), "Building HNSW graph");
                state.graph = Some(HnswGraph::build(
                    self.config.hnsw_m,
                    self.config.ef_construction,
                    &state.vectors,
                ));
            }
            None => {}
        }
    }

    /// Positions and scores of the top `k` entries
    fn ranked(
        &self,
        state: &IndexState,
        query: &Embedding,
        k: usize,
    ) -> Result<Vec<(usize, f32)>, DomainError> {
        if state.vectors.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        Self::check_dimension(state.dimension, query.dimensions())?;

        let mut prepared = query.vector().to_vec();
        self.config.metric.prepare(&mut prepared);

        Ok(match state.graph.as_ref() {
            Some(graph) => self.approximate_search(state, graph, &prepared, k),
            None => self.exact_search(state, &prepared, k),
        })
    }

    fn exact_search(&self, state: &IndexState, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        let mut scored: Vec<(usize, f32)> = state
            .vectors
            .iter()
            .enumerate()
            .map(|(position, vector)| (position, self.config.metric.score_prepared(vector, query)))
            .collect();

        rank(&mut scored);
        scored.truncate(k);
        scored
    }

    fn approximate_search(
        &self,
        state: &IndexState,
        graph: &HnswGraph,
        query: &[f32],
        k: usize,
    ) -> Vec<(usize, f32)> {
        let wanted = k.min(state.vectors.len());
        let ef = self.config.ef_search.max(k);

        let mut scored: Vec<(usize, f32)> = graph
            .search(query, ef, ef, &state.vectors)
            .into_iter()
            .map(|(position, _)| {
                let score = self.config.metric.score_prepared(&state.vectors[position], query);
                (position, score)
            })
            .collect();

        if scored.len() < wanted {
            debug!(found = scored.len(), wanted, "Graph search short, falling back to exact scan");
            return self.exact_search(state, query, k);
        }

        rank(&mut scored);
        scored.truncate(k);
        scored
    }
}

impl Default for InMemoryVectorIndex {
    fn default() -> Self {
        Self::new(IndexConfig::default())
    }
}

/// Descending score; equal scores keep insertion order
fn rank(scored: &mut [(usize, f32)]) {
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn insert(&self, entry: IndexEntry) -> Result<bool, DomainError> {
        Ok(self.insert_batch(vec![entry]).await? == 1)
    }

    async fn insert_batch(&self, entries: Vec<IndexEntry>) -> Result<usize, DomainError> {
        let mut state = self.state.write().await;

        let mut expected = state.dimension;
        for entry in &entries {
            Self::check_dimension(expected, entry.dimensions())?;
            expected = Some(entry.dimensions());
        }

        let mut seen = HashSet::new();
        let mut added = 0;
        for entry in entries {
            if state.positions.contains_key(entry.chunk_id()) || !seen.insert(entry.chunk_id().clone()) {
                continue;
            }
            self.append(&mut state, entry);
            added += 1;
        }

        Ok(added)
    }

    async fn search(&self, query: &Embedding, k: usize) -> Result<Vec<SearchHit>, DomainError> {
        let state = self.state.read().await;

        Ok(self
            .ranked(&state, query, k)?
            .into_iter()
            .map(|(position, score)| SearchHit::new(state.chunks[position].id.clone(), score))
            .collect())
    }

    async fn search_chunks(
        &self,
        query: &Embedding,
        k: usize,
    ) -> Result<Vec<(Chunk, f32)>, DomainError> {
        let state = self.state.read().await;

        Ok(self
            .ranked(&state, query, k)?
            .into_iter()
            .map(|(position, score)| (state.chunks[position].clone(), score))
            .collect())
    }

    async fn get_chunk(&self, id: &ChunkId) -> Option<Chunk> {
        let state = self.state.read().await;
        state.positions.get(id).map(|&p| state.chunks[p].clone())
    }

    async fn size(&self) -> usize {
        self.state.read().await.chunks.len()
    }

    async fn clear(&self) {
        let mut state = self.state.write().await;
        let dropped = state.chunks.len();
        *state = IndexState::default();
        info!(dropped, "Index cleared");
    }

    async fn dimension(&self) -> Option<usize> {
        self.state.read().await.dimension
    }

    async fn document_chunk_count(&self, document_id: &DocumentId) -> usize {
        self.state
            .read()
            .await
            .documents
            .get(document_id)
            .copied()
            .unwrap_or(0)
    }

    async fn preview(&self, limit: usize) -> Vec<Chunk> {
        let state = self.state.read().await;
        state.chunks.iter().take(limit).cloned().collect()
    }

    async fn entries(&self) -> Vec<IndexEntry> {
        let state = self.state.read().await;
        state
            .chunks
            .iter()
            .zip(&state.vectors)
            .map(|(chunk, vector)| IndexEntry::new(chunk.clone(), Embedding::new(vector.clone())))
            .collect()
    }

    async fn stats(&self) -> IndexStats {
        let state = self.state.read().await;
        IndexStats {
            entries: state.chunks.len(),
            documents: state.documents.len(),
            dimensions: state.dimension,
            metric: self.config.metric,
            approximate: state.graph.is_some(),
        }
    }

    fn metric(&self) -> SimilarityMetric {
        self.config.metric
    }
}
