//! Request and response bodies for the document endpoints

use serde::{Deserialize, Serialize};

use crate::domain::{BatchIngestionResult, Chunk, HistoryTurn, IndexStats};

/// Characters of chunk content shown by `/debug/chunks`
pub const PREVIEW_CHARS: usize = 300;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GreetResponse {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub history: Vec<HistoryTurn>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    #[serde(flatten)]
    pub batch: BatchIngestionResult,
    /// Chunks in the index after this upload
    pub index_size: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChunkPreview {
    pub id: String,
    pub filename: String,
    pub pages: Vec<u32>,
    pub preview: String,
}

impl ChunkPreview {
    pub fn from_chunk(chunk: &Chunk) -> Self {
        Self {
            id: chunk.id.to_string(),
            filename: chunk.filename.clone(),
            pages: chunk.pages.clone(),
            preview: chunk.content.chars().take(PREVIEW_CHARS).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChunksResponse {
    pub total_chunks: usize,
    pub dimension: Option<usize>,
    pub stats: IndexStats,
    pub chunks: Vec<ChunkPreview>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub removed_chunks: usize,
}
