use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::debug;
use super::health;
use super::middleware::metrics_middleware;
use super::rag;
use super::state::AppState;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Router settings that come from configuration rather than state
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub max_upload_bytes: usize,
    pub metrics: Option<PrometheusMetrics>,
    pub metrics_path: String,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            max_upload_bytes: 100 * 1024 * 1024,
            metrics: None,
            metrics_path: "/metrics".to_string(),
        }
    }
}

/// Create the full router with application state
pub fn create_router(state: AppState, options: RouterOptions) -> Router {
    let mut router = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .route("/greet", get(rag::greet))
        .route("/upload", post(rag::upload))
        .route("/ask", post(rag::ask))
        .route("/documents", delete(debug::clear_documents))
        .nest("/debug", debug::create_debug_router())
        .layer(DefaultBodyLimit::max(options.max_upload_bytes))
        .with_state(state);

    if let Some(metrics) = options.metrics {
        router = router.merge(create_metrics_router(metrics, &options.metrics_path));
    }

    router
        .layer(middleware::from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
