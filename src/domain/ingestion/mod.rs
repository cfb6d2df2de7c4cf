//! Document ingestion domain types and traits
//!
//! This module provides:
//! - `DocumentParser` trait for extracting page text from uploads
//! - `ChunkingStrategy` trait for splitting documents into chunks
//! - Configuration and result types for the ingestion pipeline

pub mod chunker;
pub mod parser;
pub mod pipeline;
pub mod validation;

// Re-export main types
pub use chunker::{Chunk, ChunkId, ChunkingConfig, ChunkingStrategy};
pub use parser::{
    DocumentId, DocumentMetadata, DocumentParser, PageText, ParsedDocument, ParserInput,
};
pub use pipeline::{
    BatchIngestionResult, IngestionConfig, IngestionError, IngestionResult, IngestionStatus,
    ParserType,
};
pub use validation::{
    detect_parser, detect_parser_from_content, detect_parser_from_filename,
    detect_parser_from_mime, validate_batch_size, validate_filename,
};

// Re-export mocks for testing
#[cfg(test)]
pub use chunker::mock::MockChunkingStrategy;
#[cfg(test)]
pub use parser::mock::MockDocumentParser;
