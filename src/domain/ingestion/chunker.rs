//! Chunking strategy trait and types

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use super::parser::{DocumentId, ParsedDocument};
use crate::domain::DomainError;

/// Configuration for chunking. Lengths are in Unicode characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl ChunkingConfig {
    /// Create a new chunking configuration
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.chunk_size == 0 {
            return Err(DomainError::validation("chunk_size must be greater than 0"));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(DomainError::validation(
                "chunk_overlap must be less than chunk_size",
            ));
        }

        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Chunk identifier, `<document short id>-<ordinal>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkId(String);

impl ChunkId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn for_document(document_id: &DocumentId, ordinal: usize) -> Self {
        Self(format!("{}-{}", document_id.short(), ordinal))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A span of document text; the atomic retrieval unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub document_id: DocumentId,
    /// Source filename, kept for citations
    pub filename: String,
    /// Position of this chunk within its document (0-based)
    pub ordinal: usize,
    pub content: String,
    /// 1-based page numbers this chunk spans, ascending
    pub pages: Vec<u32>,
    /// Character offset where this chunk starts in the cleaned document text
    pub char_start: usize,
    /// Character offset where this chunk ends (exclusive)
    pub char_end: usize,
}

impl Chunk {
    /// Get the content length in characters
    pub fn len(&self) -> usize {
        self.char_end - self.char_start
    }

    /// Check if the chunk is empty
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Human-readable page reference, e.g. `3` or `3-4`
    pub fn page_label(&self) -> String {
        match (self.pages.first(), self.pages.last()) {
            (Some(first), Some(last)) if first == last => first.to_string(),
            (Some(first), Some(last)) => format!("{}-{}", first, last),
            _ => String::from("?"),
        }
    }
}

/// Trait for chunking strategies
pub trait ChunkingStrategy: Send + Sync + Debug {
    /// Split a parsed document into ordered chunks. Empty documents yield no chunks.
    fn chunk(
        &self,
        document: &ParsedDocument,
        config: &ChunkingConfig,
    ) -> Result<Vec<Chunk>, DomainError>;

    /// Get the strategy name
    fn name(&self) -> &'static str;
}

/// Helper functions for chunking
pub mod helpers {
    use once_cell::sync::Lazy;
    use regex::Regex;

    use super::ParsedDocument;

    static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

    /// Strip control characters and collapse whitespace runs into single spaces
    pub fn clean_text(text: &str) -> String {
        let printable: String = text
            .chars()
            .map(|c| if c.is_control() && !c.is_whitespace() { ' ' } else { c })
            .collect();

        WHITESPACE.replace_all(&printable, " ").trim().to_string()
    }

    /// Cleaned document text with the character range each page occupies.
    /// Blank pages get no range; consecutive pages are joined by a single space.
    #[derive(Debug, Clone, Default)]
    pub struct PageLayout {
        pub text: Vec<char>,
        /// (page number, start, end) in char offsets, ascending
        pub spans: Vec<(u32, usize, usize)>,
    }

    impl PageLayout {
        pub fn from_document(document: &ParsedDocument) -> Self {
            let mut layout = Self::default();

            for page in &document.pages {
                let cleaned = clean_text(&page.text);
                if cleaned.is_empty() {
                    continue;
                }

                if !layout.text.is_empty() {
                    layout.text.push(' ');
                }

                let start = layout.text.len();
                layout.text.extend(cleaned.chars());
                layout.spans.push((page.number, start, layout.text.len()));
            }

            layout
        }

        pub fn len(&self) -> usize {
            self.text.len()
        }

        pub fn is_empty(&self) -> bool {
            self.text.is_empty()
        }

        /// Pages overlapping `[start, end)`. A range lying purely on a page separator
        /// is attributed to the preceding page.
        pub fn pages_for_range(&self, start: usize, end: usize) -> Vec<u32> {
            let pages: Vec<u32> = self
                .spans
                .iter()
                .filter(|(_, s, e)| *s < end && start < *e)
                .map(|(n, _, _)| *n)
                .collect();

            if !pages.is_empty() {
                return pages;
            }

            self.spans
                .iter()
                .rev()
                .find(|(_, s, _)| *s <= start)
                .map(|(n, _, _)| vec![*n])
                .unwrap_or_default()
        }

        pub fn slice(&self, start: usize, end: usize) -> String {
            self.text[start..end].iter().collect()
        }
    }

    /// Latest position in `(min, max]` directly after a whitespace char, if any
    pub fn find_word_boundary_before(text: &[char], min: usize, max: usize) -> Option<usize> {
        (min + 1..=max)
            .rev()
            .find(|&pos| text[pos - 1].is_whitespace())
    }

    /// First word start at or after `pos`, never beyond `limit`
    pub fn find_word_boundary_after(text: &[char], pos: usize, limit: usize) -> usize {
        if pos == 0 || pos >= limit || text[pos - 1].is_whitespace() {
            return pos;
        }

        (pos..limit)
            .find(|&p| text[p].is_whitespace())
            .map(|p| p + 1)
            .filter(|&p| p < limit)
            .unwrap_or(pos)
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Mock chunking strategy for testing; by default one chunk per non-blank page
    #[derive(Debug)]
    pub struct MockChunkingStrategy {
        result: Mutex<Option<Result<Vec<Chunk>, String>>>,
    }

    impl MockChunkingStrategy {
        pub fn new() -> Self {
            Self {
                result: Mutex::new(None),
            }
        }

        pub fn with_error(self, error: impl Into<String>) -> Self {
            *self.result.lock().unwrap() = Some(Err(error.into()));
            self
        }
    }

    impl Default for MockChunkingStrategy {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ChunkingStrategy for MockChunkingStrategy {
        fn chunk(
            &self,
            document: &ParsedDocument,
            config: &ChunkingConfig,
        ) -> Result<Vec<Chunk>, DomainError> {
            if let Some(result) = self.result.lock().unwrap().take() {
                return result.map_err(DomainError::validation);
            }

            config.validate()?;

            let mut offset = 0;
            Ok(document
                .pages
                .iter()
                .filter(|p| !p.is_blank())
                .enumerate()
                .map(|(ordinal, page)| {
                    let len = page.text.chars().count();
                    let chunk = Chunk {
                        id: ChunkId::for_document(&document.id, ordinal),
                        document_id: document.id.clone(),
                        filename: document.filename.clone(),
                        ordinal,
                        content: page.text.clone(),
                        pages: vec![page.number],
                        char_start: offset,
                        char_end: offset + len,
                    };
                    offset += len;
                    chunk
                })
                .collect())
        }

        fn name(&self) -> &'static str {
            "mock"
        }
    }
}
