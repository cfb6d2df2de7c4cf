//! Factory for creating parsers and chunkers

use std::sync::Arc;

use crate::domain::ingestion::{ChunkingStrategy, DocumentParser, ParserType};

use super::chunkers::SlidingWindowChunker;
use super::parsers::{PdfParser, PlainTextParser};

/// Factory for creating document parsers
#[derive(Debug, Default)]
pub struct ParserFactory;

impl ParserFactory {
    /// Create a parser for the given type
    pub fn create(parser_type: ParserType) -> Arc<dyn DocumentParser> {
        match parser_type {
            ParserType::Pdf => Arc::new(PdfParser::new()),
            ParserType::PlainText => Arc::new(PlainTextParser::new()),
        }
    }

    /// Get a list of all supported file extensions
    pub fn supported_extensions() -> Vec<&'static str> {
        vec!["pdf", "txt", "text"]
    }
}

/// Factory for creating chunking strategies
#[derive(Debug, Default)]
pub struct ChunkerFactory;

impl ChunkerFactory {
    /// Create the default chunker
    pub fn create() -> Arc<dyn ChunkingStrategy> {
        Arc::new(SlidingWindowChunker::new())
    }
}
