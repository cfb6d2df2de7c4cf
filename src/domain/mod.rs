//! Domain layer - Core types, capability traits and pure logic

pub mod embedding;
pub mod error;
pub mod index;
pub mod ingestion;
pub mod llm;
pub mod prompt;
pub mod query;
pub mod retrieval;

pub use embedding::{Embedding, EmbeddingProvider};
pub use error::{DomainError, ErrorKind};
pub use index::{IndexEntry, IndexStats, SearchHit, SimilarityMetric, VectorIndex};
pub use ingestion::{
    BatchIngestionResult, Chunk, ChunkId, ChunkingConfig, ChunkingStrategy, DocumentId,
    DocumentMetadata, DocumentParser, IngestionConfig, IngestionError, IngestionResult,
    IngestionStatus, PageText, ParsedDocument, ParserInput, ParserType,
};
pub use llm::{LlmProvider, LlmRequest, LlmRequestBuilder, LlmResponse, Usage};
pub use prompt::{AssembledPrompt, PromptAssembler};
pub use query::{Answer, Citation, GenerationOptions, HistoryRole, HistoryTurn, QueryConfig};
pub use retrieval::{RetrievedChunk, RetrievedContext, Retriever};
