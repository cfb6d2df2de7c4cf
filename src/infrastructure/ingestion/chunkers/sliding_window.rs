//! Sliding-window chunking strategy

use crate::domain::ingestion::chunker::helpers::{self, PageLayout};
use crate::domain::ingestion::{Chunk, ChunkId, ChunkingConfig, ChunkingStrategy, ParsedDocument};
use crate::domain::DomainError;

/// Splits the cleaned, page-concatenated text into overlapping windows of
/// `chunk_size` characters. A window ends just after the last whitespace in its
/// second half when there is one. Consecutive windows overlap by up to
/// `chunk_overlap` characters and never leave a gap.
#[derive(Debug, Clone)]
pub struct SlidingWindowChunker {
    /// Whether to respect word boundaries
    respect_word_boundaries: bool,
}

impl SlidingWindowChunker {
    /// Create a new sliding-window chunker
    pub fn new() -> Self {
        Self {
            respect_word_boundaries: true,
        }
    }

    /// Set whether to respect word boundaries
    pub fn with_word_boundaries(mut self, respect: bool) -> Self {
        self.respect_word_boundaries = respect;
        self
    }

    fn find_chunk_end(&self, text: &[char], start: usize, chunk_size: usize) -> usize {
        let target_end = (start + chunk_size).min(text.len());

        if !self.respect_word_boundaries || target_end == text.len() {
            return target_end;
        }

        helpers::find_word_boundary_before(text, start + chunk_size / 2, target_end)
            .unwrap_or(target_end)
    }

    fn find_next_start(&self, text: &[char], start: usize, end: usize, overlap: usize) -> usize {
        let mut next = end.saturating_sub(overlap);

        if self.respect_word_boundaries {
            next = helpers::find_word_boundary_after(text, next, end);
        }

        if next <= start { end } else { next }
    }
}

impl Default for SlidingWindowChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkingStrategy for SlidingWindowChunker {
    fn chunk(
        &self,
        document: &ParsedDocument,
        config: &ChunkingConfig,
    ) -> Result<Vec<Chunk>, DomainError> {
        config.validate()?;

        let layout = PageLayout::from_document(document);
        if layout.is_empty() {
            return Ok(vec![]);
        }

        let text = &layout.text;
        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            let end = self.find_chunk_end(text, start, config.chunk_size);
            let ordinal = chunks.len();

            chunks.push(Chunk {
                id: ChunkId::for_document(&document.id, ordinal),
                document_id: document.id.clone(),
                filename: document.filename.clone(),
                ordinal,
                content: layout.slice(start, end),
                pages: layout.pages_for_range(start, end),
                char_start: start,
                char_end: end,
            });

            if end >= text.len() {
                break;
            }

            start = self.find_next_start(text, start, end, config.chunk_overlap);
        }

        Ok(chunks)
    }

    fn name(&self) -> &'static str {
        "sliding_window"
    }
}
