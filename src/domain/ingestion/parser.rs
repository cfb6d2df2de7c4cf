//! Document parser trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::Debug;

use crate::domain::DomainError;

/// Content-derived document identifier (hex SHA-256 of the uploaded bytes)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Derive the identifier from raw document bytes
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(bytes)))
    }

    /// Wrap an already computed identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 16 hex characters, used as the chunk id prefix
    pub fn short(&self) -> &str {
        let end = self.0.len().min(16);
        &self.0[..end]
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Input for document parsing
#[derive(Debug, Clone)]
pub struct ParserInput {
    /// Raw uploaded bytes
    pub bytes: Vec<u8>,
    /// Original filename, used for citations and type detection
    pub filename: String,
    /// Declared MIME type, if the transport supplied one
    pub mime_type: Option<String>,
}

impl ParserInput {
    /// Create input from binary content
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            filename: String::from("document"),
            mime_type: None,
        }
    }

    /// Set the filename
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// Set the declared MIME type
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Identifier this input will be stored under
    pub fn document_id(&self) -> DocumentId {
        DocumentId::from_bytes(&self.bytes)
    }
}

/// Text of a single page; `number` is 1-based
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

impl PageText {
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Metadata extracted from a document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Document title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Document author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// MIME type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Pages whose text could not be extracted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unreadable_pages: Vec<u32>,
}

impl DocumentMetadata {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Set title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set MIME type
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Result of parsing a document. Immutable once produced.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub id: DocumentId,
    pub filename: String,
    /// Pages in document order
    pub pages: Vec<PageText>,
    pub metadata: DocumentMetadata,
}

impl ParsedDocument {
    pub fn new(id: DocumentId, filename: impl Into<String>, pages: Vec<PageText>) -> Self {
        Self {
            id,
            filename: filename.into(),
            pages,
            metadata: DocumentMetadata::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Total extracted characters across all pages
    pub fn char_count(&self) -> usize {
        self.pages.iter().map(|p| p.text.chars().count()).sum()
    }

    /// True when no page carries any text
    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(PageText::is_blank)
    }
}

/// Trait for document parsers
#[async_trait]
pub trait DocumentParser: Send + Sync + Debug {
    /// Get supported file extensions (e.g., ["pdf"])
    fn supported_extensions(&self) -> &[&str];

    /// Get supported MIME types (e.g., ["application/pdf"])
    fn supported_mime_types(&self) -> &[&str];

    /// Extract page texts. Fails with `UnreadableDocument` when the file as a whole
    /// cannot be read; individual unreadable pages yield empty text instead.
    async fn parse(&self, input: ParserInput) -> Result<ParsedDocument, DomainError>;

    /// Check if this parser supports a given filename
    fn supports_file(&self, filename: &str) -> bool {
        let Some((_, ext)) = filename.rsplit_once('.') else {
            return false;
        };

        self.supported_extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Check if this parser supports a given MIME type
    fn supports_mime(&self, mime: &str) -> bool {
        self.supported_mime_types()
            .iter()
            .any(|m| mime.starts_with(*m))
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Mock document parser for testing. Without a configured result it treats the
    /// input as UTF-8 with form-feed page breaks.
    #[derive(Debug)]
    pub struct MockDocumentParser {
        extensions: Vec<&'static str>,
        mime_types: Vec<&'static str>,
        result: Mutex<Option<Result<Vec<PageText>, String>>>,
    }

    impl MockDocumentParser {
        pub fn new() -> Self {
            Self {
                extensions: vec!["txt"],
                mime_types: vec!["text/plain"],
                result: Mutex::new(None),
            }
        }

        pub fn with_pages(self, pages: Vec<PageText>) -> Self {
            *self.result.lock().unwrap() = Some(Ok(pages));
            self
        }

        pub fn with_error(self, error: impl Into<String>) -> Self {
            *self.result.lock().unwrap() = Some(Err(error.into()));
            self
        }
    }

    impl Default for MockDocumentParser {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl DocumentParser for MockDocumentParser {
        fn supported_extensions(&self) -> &[&str] {
            &self.extensions
        }

        fn supported_mime_types(&self) -> &[&str] {
            &self.mime_types
        }

        async fn parse(&self, input: ParserInput) -> Result<ParsedDocument, DomainError> {
            let id = input.document_id();

            let pages = match self.result.lock().unwrap().take() {
                Some(result) => result.map_err(DomainError::unreadable_document)?,
                None => String::from_utf8_lossy(&input.bytes)
                    .split('\u{c}')
                    .enumerate()
                    .map(|(i, text)| PageText::new(i as u32 + 1, text))
                    .collect(),
            };

            Ok(ParsedDocument::new(id, input.filename, pages))
        }
    }
}
