//! Retriever backed by the shared vector index

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::retrieval::{RetrievedChunk, RetrievedContext, Retriever};
use crate::domain::{DomainError, EmbeddingProvider, VectorIndex};

/// Embeds the query, searches the index and resolves hits to full chunks
#[derive(Debug, Clone)]
pub struct IndexRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    relevance_floor: Option<f32>,
}

impl IndexRetriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            embedder,
            index,
            relevance_floor: None,
        }
    }

    pub fn with_relevance_floor(mut self, floor: Option<f32>) -> Self {
        self.relevance_floor = floor;
        self
    }
}

#[async_trait]
impl Retriever for IndexRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> Result<RetrievedContext, DomainError> {
        if k == 0 || self.index.is_empty().await {
            return Ok(RetrievedContext::empty());
        }

        let embedding = self.embedder.embed(query).await?;
        let chunks = self
            .index
            .search_chunks(&embedding, k)
            .await?
            .into_iter()
            .map(|(chunk, score)| RetrievedChunk::new(chunk, score))
            .collect();

        let context = RetrievedContext::new(chunks).with_floor(self.relevance_floor);
        debug!(k, retrieved = context.len(), "Retrieved context");
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::ingestion::{Chunk, ChunkId, DocumentId};
    use crate::domain::IndexEntry;
    use crate::infrastructure::index::InMemoryVectorIndex;

    async fn index_with(embedder: &MockEmbeddingProvider, texts: &[&str]) -> Arc<InMemoryVectorIndex> {
        let index = Arc::new(InMemoryVectorIndex::default());
        let document_id = DocumentId::new("feedfacefeedface");

        for (ordinal, text) in texts.iter().enumerate() {
            let chunk = Chunk {
                id: ChunkId::for_document(&document_id, ordinal),
                document_id: document_id.clone(),
                filename: "manual.pdf".to_string(),
                ordinal,
                content: text.to_string(),
                pages: vec![1],
                char_start: 0,
                char_end: text.chars().count(),
            };
            let embedding = embedder.embed(text).await.unwrap();
            index.insert(IndexEntry::new(chunk, embedding)).await.unwrap();
        }

        index
    }

    #[tokio::test]
    async fn test_retrieve_most_relevant_first() {
        let embedder = MockEmbeddingProvider::new(128);
        let index = index_with(
            &embedder,
            &["oil change interval", "pump pressure rating", "pump pressure and flow"],
        )
        .await;
        let retriever = IndexRetriever::new(Arc::new(embedder), index);

        let context = retriever.retrieve("pump pressure", 2).await.unwrap();

        assert_eq!(context.len(), 2);
        assert!(context.chunks()[0].chunk.content.contains("pump pressure"));
        assert!(context.chunks()[0].score >= context.chunks()[1].score);
    }

    #[tokio::test]
    async fn test_empty_index_is_not_an_error() {
        let embedder = Arc::new(MockEmbeddingProvider::new(16));
        let retriever = IndexRetriever::new(embedder.clone(), Arc::new(InMemoryVectorIndex::default()));

        let context = retriever.retrieve("anything", 5).await.unwrap();

        assert!(context.is_empty());
        assert_eq!(embedder.calls(), 0);
    }

    #[tokio::test]
    async fn test_relevance_floor_filters() {
        let embedder = MockEmbeddingProvider::new(128);
        let index = index_with(&embedder, &["pump pressure", "warranty terms"]).await;
        let retriever = IndexRetriever::new(Arc::new(embedder), index).with_relevance_floor(Some(0.6));

        let context = retriever.retrieve("pump pressure", 5).await.unwrap();

        assert_eq!(context.len(), 1);
        assert_eq!(context.chunks()[0].chunk.content, "pump pressure");
    }

    #[tokio::test]
    async fn test_embedding_failure_surfaces() {
        let embedder = MockEmbeddingProvider::new(16);
        let index = index_with(&embedder, &["text"]).await;
        let retriever = IndexRetriever::new(
            Arc::new(MockEmbeddingProvider::new(16).with_error("connection refused")),
            index,
        );

        let result = retriever.retrieve("text", 3).await;

        assert!(matches!(result, Err(DomainError::EmbeddingUnavailable { .. })));
    }
}
