//! Ingestion pipeline types and configuration

use serde::{Deserialize, Serialize};

use super::chunker::ChunkingConfig;
use crate::domain::{DomainError, ErrorKind};

/// Type of document parser to use
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParserType {
    /// PDF files, extracted page by page
    Pdf,
    /// Plain text files, form-feed separated pages
    PlainText,
}

impl ParserType {
    /// Get file extensions associated with this parser type
    pub fn extensions(&self) -> &[&str] {
        match self {
            Self::Pdf => &["pdf"],
            Self::PlainText => &["txt", "text"],
        }
    }

    /// Get MIME types associated with this parser type
    pub fn mime_types(&self) -> &[&str] {
        match self {
            Self::Pdf => &["application/pdf"],
            Self::PlainText => &["text/plain"],
        }
    }
}

/// Configuration for document ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Chunking configuration
    #[serde(flatten)]
    pub chunking_config: ChunkingConfig,
    /// Number of chunks sent to the embedder per request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Embedding requests in flight per document
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Upper bound on parsing a single document
    #[serde(default = "default_parse_timeout_secs")]
    pub parse_timeout_secs: u64,
}

fn default_batch_size() -> usize {
    32
}

fn default_concurrency() -> usize {
    4
}

fn default_parse_timeout_secs() -> u64 {
    60
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            chunking_config: ChunkingConfig::default(),
            batch_size: default_batch_size(),
            concurrency: default_concurrency(),
            parse_timeout_secs: default_parse_timeout_secs(),
        }
    }
}

impl IngestionConfig {
    /// Create a new ingestion configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set chunk size
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunking_config.chunk_size = size;
        self
    }

    /// Set chunk overlap
    pub fn with_chunk_overlap(mut self, overlap: usize) -> Self {
        self.chunking_config.chunk_overlap = overlap;
        self
    }

    /// Set batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set embedding concurrency
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set parse timeout
    pub fn with_parse_timeout_secs(mut self, secs: u64) -> Self {
        self.parse_timeout_secs = secs;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        self.chunking_config.validate()?;
        super::validation::validate_batch_size(self.batch_size)?;

        if self.concurrency == 0 {
            return Err(DomainError::validation("concurrency must be greater than 0"));
        }

        if self.parse_timeout_secs == 0 {
            return Err(DomainError::validation(
                "parse_timeout_secs must be greater than 0",
            ));
        }

        Ok(())
    }
}

/// Outcome of ingesting one uploaded file
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IngestionStatus {
    /// New chunks were added to the index
    Indexed,
    /// Identical bytes were already indexed; nothing was added
    Duplicate,
    /// The document parsed but contained no text
    Empty,
    /// The document was skipped
    Failed,
}

impl IngestionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Indexed => "indexed",
            Self::Duplicate => "duplicate",
            Self::Empty => "empty",
            Self::Failed => "failed",
        }
    }
}

/// Why a document could not be ingested
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestionError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&DomainError> for IngestionError {
    fn from(err: &DomainError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Result of ingesting a single document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionResult {
    /// Uploaded filename
    pub filename: String,
    /// Content hash of the document, absent if the upload could not be read at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    pub status: IngestionStatus,
    /// Number of chunks the document has in the index
    pub chunks_created: usize,
    /// Non-fatal observations, e.g. blank pages
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<IngestionError>,
}

impl IngestionResult {
    /// Create a successful result
    pub fn indexed(
        filename: impl Into<String>,
        document_id: impl Into<String>,
        chunks_created: usize,
    ) -> Self {
        Self {
            filename: filename.into(),
            document_id: Some(document_id.into()),
            status: IngestionStatus::Indexed,
            chunks_created,
            warnings: Vec::new(),
            error: None,
        }
    }

    /// Create a result for a document that was already indexed
    pub fn duplicate(
        filename: impl Into<String>,
        document_id: impl Into<String>,
        existing_chunks: usize,
    ) -> Self {
        Self {
            status: IngestionStatus::Duplicate,
            ..Self::indexed(filename, document_id, existing_chunks)
        }
    }

    /// Create a result for a document without extractable text
    pub fn empty(filename: impl Into<String>, document_id: impl Into<String>) -> Self {
        Self {
            status: IngestionStatus::Empty,
            ..Self::indexed(filename, document_id, 0)
        }
        .with_warning("document contains no extractable text")
    }

    /// Create a failed result
    pub fn failed(
        filename: impl Into<String>,
        document_id: Option<String>,
        error: &DomainError,
    ) -> Self {
        Self {
            filename: filename.into(),
            document_id,
            status: IngestionStatus::Failed,
            chunks_created: 0,
            warnings: Vec::new(),
            error: Some(IngestionError::from(error)),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// Anything other than `Failed` counts as success
    pub fn is_success(&self) -> bool {
        self.status != IngestionStatus::Failed
    }
}

/// Result of batch ingestion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchIngestionResult {
    /// Total documents processed
    pub total_documents: usize,
    /// Number of successful documents
    pub successful: usize,
    /// Number of failed documents
    pub failed: usize,
    /// Individual results, in upload order
    pub results: Vec<IngestionResult>,
}

impl BatchIngestionResult {
    /// Create an empty batch result
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a result to the batch
    pub fn add(&mut self, result: IngestionResult) {
        self.total_documents += 1;

        if result.is_success() {
            self.successful += 1;
        } else {
            self.failed += 1;
        }

        self.results.push(result);
    }

    /// Check if all documents were processed successfully
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Chunks added by this batch (duplicates excluded)
    pub fn total_chunks_created(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == IngestionStatus::Indexed)
            .map(|r| r.chunks_created)
            .sum()
    }

    /// Whether this batch changed the index
    pub fn changed_index(&self) -> bool {
        self.total_chunks_created() > 0
    }
}
