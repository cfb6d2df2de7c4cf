//! API request, response and error types

pub mod error;
pub mod json;
pub mod rag;

pub use error::{status_for, ApiError, ApiErrorDetail, ApiErrorResponse};
pub use json::Json;
pub use rag::{
    AskRequest, ChunkPreview, ChunksResponse, ClearResponse, GreetResponse, UploadResponse,
    PREVIEW_CHARS,
};
