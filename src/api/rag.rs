//! Greeting, upload and question endpoints

use axum::extract::{Multipart, State};
use tracing::warn;

use super::state::AppState;
use super::types::{ApiError, AskRequest, GreetResponse, Json, UploadResponse};
use crate::domain::{Answer, ParserInput};

/// GET /greet
pub async fn greet(State(state): State<AppState>) -> Json<GreetResponse> {
    Json(GreetResponse {
        message: state.greeting.clone(),
    })
}

/// POST /upload
///
/// Every multipart field that carries a filename is ingested; other fields are ignored.
/// Per-file failures are reported in the body, so the request itself only fails when
/// nothing was uploaded or the body could not be read.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut inputs = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), "validation", e.body_text()))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let mime_type = field.content_type().map(str::to_string);

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::new(e.status(), "validation", e.body_text()))?;

        let mut input = ParserInput::from_bytes(bytes.to_vec()).with_filename(filename);
        if let Some(mime_type) = mime_type {
            input = input.with_mime_type(mime_type);
        }
        inputs.push(input);
    }

    if inputs.is_empty() {
        return Err(ApiError::bad_request("No files uploaded"));
    }

    let batch = state.ingestion.ingest_batch(inputs).await;

    if batch.changed_index() {
        if let Err(e) = state.save_checkpoint().await {
            warn!(error = %e, "Failed to save index checkpoint");
        }
    }

    let index_size = state.index.size().await;

    Ok(Json(UploadResponse { batch, index_size }))
}

/// POST /ask
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<Answer>, ApiError> {
    if request.question.trim().is_empty() {
        return Err(ApiError::bad_request("Question cannot be empty"));
    }

    let answer = state.query.ask(&request.question, &request.history).await?;
    Ok(Json(answer))
}
