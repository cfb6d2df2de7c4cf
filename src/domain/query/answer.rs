use serde::{Deserialize, Serialize};

use crate::domain::ingestion::{ChunkId, DocumentId};
use crate::domain::retrieval::RetrievedChunk;

/// Returned when a question arrives before any document was indexed
pub const NO_DOCUMENTS_ANSWER: &str =
    "No documents have been uploaded yet. Upload a PDF first, then ask your question again.";

/// Who said a prior conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    User,
    Assistant,
}

impl HistoryRole {
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

/// A previous exchange supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: HistoryRole,
    pub content: String,
}

impl HistoryTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: HistoryRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: HistoryRole::Assistant,
            content: content.into(),
        }
    }
}

/// Reference from an answer back to a supporting chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// The `Source N` marker used in the prompt
    pub source: usize,
    pub chunk_id: ChunkId,
    pub document_id: DocumentId,
    pub filename: String,
    pub pages: Vec<u32>,
    pub score: f32,
}

impl Citation {
    pub fn from_retrieved(source: usize, retrieved: &RetrievedChunk) -> Self {
        Self {
            source,
            chunk_id: retrieved.chunk.id.clone(),
            document_id: retrieved.chunk.document_id.clone(),
            filename: retrieved.chunk.filename.clone(),
            pages: retrieved.chunk.pages.clone(),
            score: retrieved.score,
        }
    }
}

/// A generated answer and the chunks it was grounded on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub citations: Vec<Citation>,
    /// Characters in the prompt sent to the model; 0 when no model call was made
    pub prompt_chars: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// JSON object the model appended to its answer, if any
    #[serde(default)]
    pub structured: Option<serde_json::Value>,
    /// Short source snippets, from the model output or the leading excerpts
    #[serde(default)]
    pub sources: Vec<String>,
    /// Unprocessed model output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl Answer {
    /// Fixed reply for an empty index
    pub fn no_documents() -> Self {
        Self {
            answer: NO_DOCUMENTS_ANSWER.to_string(),
            citations: Vec::new(),
            prompt_chars: 0,
            model: None,
            structured: None,
            sources: Vec::new(),
            raw: None,
        }
    }

    pub fn cited_chunk_ids(&self) -> Vec<&ChunkId> {
        self.citations.iter().map(|c| &c.chunk_id).collect()
    }
}
