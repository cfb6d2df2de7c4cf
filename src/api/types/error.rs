//! Error payloads returned by every endpoint

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, ErrorKind};

/// `{"error": {"kind": "...", "message": "..."}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    /// Stable machine-readable failure kind
    pub kind: String,
    pub message: String,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    kind: kind.into(),
                    message: message.into(),
                },
            },
        }
    }

    /// Bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorKind::Validation.as_str(), message)
    }

}

/// HTTP status for each failure kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::UnreadableDocument => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::DimensionMismatch | ErrorKind::ModelMismatch => StatusCode::CONFLICT,
        ErrorKind::EmbeddingUnavailable | ErrorKind::GenerationUnavailable => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::Configuration | ErrorKind::Storage | ErrorKind::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let kind = err.kind();
        let status = status_for(kind);

        if status.is_server_error() {
            tracing::error!(kind = %kind, error = %err, "Request failed");
        } else {
            tracing::debug!(kind = %kind, error = %err, "Request rejected");
        }

        Self::new(status, kind.as_str(), err.to_string())
    }
}
