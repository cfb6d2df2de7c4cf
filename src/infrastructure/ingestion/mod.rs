//! Document ingestion infrastructure
//!
//! This module provides implementations for document parsing, chunking,
//! and the ingestion pipeline.

pub mod chunkers;
pub mod factory;
pub mod parsers;
pub mod pipeline;

// Re-export parsers
pub use parsers::{PdfParser, PlainTextParser};

// Re-export chunkers
pub use chunkers::SlidingWindowChunker;

// Re-export factories
pub use factory::{ChunkerFactory, ParserFactory};

// Re-export pipeline
pub use pipeline::IngestionPipeline;
