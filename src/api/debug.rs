//! Index inspection, backend checks and index reset

use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};

use super::state::AppState;
use super::types::{ApiError, ChunkPreview, ChunksResponse, ClearResponse, Json};
use crate::infrastructure::observability::set_index_size;
use crate::infrastructure::probe::probe_llm;

/// Chunks listed by `/debug/chunks`
const PREVIEW_LIMIT: usize = 10;

pub fn create_debug_router() -> Router<AppState> {
    Router::new()
        .route("/chunks", get(list_chunks))
        .route("/llm", get(check_llm))
}

/// GET /debug/chunks
pub async fn list_chunks(State(state): State<AppState>) -> Json<ChunksResponse> {
    let stats = state.index.stats().await;
    let chunks = state
        .index
        .preview(PREVIEW_LIMIT)
        .await
        .iter()
        .map(ChunkPreview::from_chunk)
        .collect();

    Json(ChunksResponse {
        total_chunks: stats.entries,
        dimension: stats.dimensions,
        stats,
        chunks,
    })
}

/// GET /debug/llm
pub async fn check_llm(State(state): State<AppState>) -> impl IntoResponse {
    let timeout = Duration::from_secs(state.query.config().generation_timeout_secs);
    let probe = probe_llm(state.query.llm().as_ref(), timeout).await;

    let status = if probe.ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(probe))
}

/// DELETE /documents
pub async fn clear_documents(
    State(state): State<AppState>,
) -> Result<Json<ClearResponse>, ApiError> {
    let removed_chunks = state.index.size().await;
    state.index.clear().await;
    set_index_size(0);

    state.clear_checkpoint().await?;

    tracing::info!(removed_chunks, "Index cleared");
    Ok(Json(ClearResponse { removed_chunks }))
}
