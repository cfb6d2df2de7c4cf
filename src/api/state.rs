//! Application state shared by all handlers

use std::sync::Arc;

use crate::domain::{DomainError, EmbeddingProvider, VectorIndex};
use crate::infrastructure::index::IndexCheckpoint;
use crate::infrastructure::ingestion::IngestionPipeline;
use crate::infrastructure::query::QueryPipeline;

/// Application state containing all shared services
#[derive(Clone, Debug)]
pub struct AppState {
    pub ingestion: Arc<IngestionPipeline>,
    pub query: Arc<QueryPipeline>,
    pub index: Arc<dyn VectorIndex>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub checkpoint: Option<Arc<IndexCheckpoint>>,
    pub greeting: String,
}

impl AppState {
    pub fn new(
        ingestion: IngestionPipeline,
        query: QueryPipeline,
        embedder: Arc<dyn EmbeddingProvider>,
        greeting: impl Into<String>,
    ) -> Self {
        let index = Arc::clone(ingestion.index());

        Self {
            ingestion: Arc::new(ingestion),
            query: Arc::new(query),
            index,
            embedder,
            checkpoint: None,
            greeting: greeting.into(),
        }
    }

    pub fn with_checkpoint(mut self, checkpoint: IndexCheckpoint) -> Self {
        self.checkpoint = Some(Arc::new(checkpoint));
        self
    }

    /// Write the index to the checkpoint directory, if one is configured
    pub async fn save_checkpoint(&self) -> Result<(), DomainError> {
        let Some(checkpoint) = &self.checkpoint else {
            return Ok(());
        };

        let manifest = checkpoint
            .save(self.index.as_ref(), self.embedder.model_name())
            .await?;

        tracing::info!(
            dir = %checkpoint.dir().display(),
            entries = manifest.entry_count,
            "Index checkpoint saved"
        );
        Ok(())
    }

    /// Remove the on-disk checkpoint, if one is configured
    pub async fn clear_checkpoint(&self) -> Result<(), DomainError> {
        match &self.checkpoint {
            Some(checkpoint) => checkpoint.clear().await,
            None => Ok(()),
        }
    }
}
