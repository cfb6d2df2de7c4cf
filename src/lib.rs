//! Lumina RAG
//!
//! Question answering over uploaded PDF documents with locally hosted models:
//! - Page-aware PDF and plain-text parsing
//! - Overlapping character-window chunking
//! - Ollama or offline hashing embeddings
//! - In-memory vector index with exact search and HNSW, optional disk checkpoints
//! - Grounded prompts with `Source N` citations answered by an Ollama model

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::VectorIndex;
use infrastructure::{
    embedding::EmbeddingProviderFactory,
    index::{InMemoryVectorIndex, IndexCheckpoint},
    ingestion::IngestionPipeline,
    llm::LlmProviderFactory,
    observability::set_index_size,
    query::QueryPipeline,
};
use tracing::info;

/// Build every service from configuration, restoring the index checkpoint if one exists
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let embedder = EmbeddingProviderFactory::create(
        &config.embedding_provider_config(),
        config.embedding_timeout(),
    )?;
    let llm = LlmProviderFactory::create(&config.llm_provider_config(), config.llm_timeout())?;

    info!(
        embedding_provider = embedder.provider_name(),
        embedding_model = embedder.model_name(),
        llm_provider = llm.provider_name(),
        llm_model = llm.model_name(),
        "Model backends configured"
    );

    let index: Arc<dyn VectorIndex> = Arc::new(InMemoryVectorIndex::new(config.index.clone()));

    let checkpoint = match &config.index.checkpoint_dir {
        Some(dir) => {
            let checkpoint = IndexCheckpoint::new(dir);
            let loaded = checkpoint
                .load(index.as_ref(), embedder.model_name(), embedder.dimensions())
                .await?;

            match loaded {
                Some(entries) => info!(entries, dir = %dir.display(), "Index restored"),
                None => info!(dir = %dir.display(), "No index checkpoint yet"),
            }
            Some(checkpoint)
        }
        None => None,
    };

    set_index_size(index.size().await);

    let ingestion = IngestionPipeline::new(
        Arc::clone(&embedder),
        Arc::clone(&index),
        config.ingestion_config(),
    );
    let query = QueryPipeline::new(Arc::clone(&embedder), index, llm, config.query_config());

    let mut state = AppState::new(ingestion, query, embedder, config.server.greeting.clone());
    if let Some(checkpoint) = checkpoint {
        state = state.with_checkpoint(checkpoint);
    }

    Ok(state)
}
