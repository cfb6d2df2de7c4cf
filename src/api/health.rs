//! Health check endpoints for container probes

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::api::types::Json;
use crate::domain::SimilarityMetric;

use super::state::AppState;

/// Health response for `/health`
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Readiness response with the index state
#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: HealthStatus,
    pub version: String,
    pub index: IndexReadiness,
}

#[derive(Serialize)]
pub struct IndexReadiness {
    pub size: usize,
    pub documents: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<usize>,
    pub metric: SimilarityMetric,
    pub embedding_model: String,
    pub checkpointed: bool,
}

/// Returns 200 while the process is serving requests
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

/// Readiness with index size and dimension
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.index.stats().await;

    let response = ReadyResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        index: IndexReadiness {
            size: stats.entries,
            documents: stats.documents,
            dimension: stats.dimensions,
            metric: stats.metric,
            embedding_model: state.embedder.model_name().to_string(),
            checkpointed: state.checkpoint.is_some(),
        },
    };

    (StatusCode::OK, Json(response))
}

pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}
