//! Prometheus metrics infrastructure
//!
//! Recording helpers are no-ops until a recorder is installed, so pipelines call them
//! unconditionally.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use regex::Regex;

use super::config::MetricsConfig;

static HEX_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9a-f]{16,}").unwrap());
static NUMERIC_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics").finish_non_exhaustive()
    }
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the /metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("rag_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Create the metrics router
pub fn create_metrics_router<S>(metrics: PrometheusMetrics, path: &str) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

/// Record the outcome of ingesting one document
pub fn record_document_ingested(status: &str, chunks: usize, duration: Duration) {
    counter!("rag_documents_ingested_total", "status" => status.to_string()).increment(1);
    histogram!("rag_ingestion_duration_seconds").record(duration.as_secs_f64());

    if chunks > 0 {
        counter!("rag_chunks_indexed_total").increment(chunks as u64);
    }
}

/// Record the outcome of answering one question
pub fn record_query(status: &str, duration: Duration) {
    counter!("rag_queries_total", "status" => status.to_string()).increment(1);
    histogram!("rag_query_duration_seconds").record(duration.as_secs_f64());
}

/// Record a completion call against the language model
pub fn record_llm_request(params: LlmRequestMetricParams) {
    let labels = [
        ("provider", params.provider.to_string()),
        ("model", params.model.to_string()),
        ("status", if params.success { "success" } else { "error" }.to_string()),
    ];

    counter!("llm_requests_total", &labels).increment(1);
    histogram!("llm_request_duration_seconds", &labels).record(params.duration.as_secs_f64());

    if let Some(tokens) = params.input_tokens {
        counter!("llm_input_tokens_total", &labels).increment(tokens);
    }

    if let Some(tokens) = params.output_tokens {
        counter!("llm_output_tokens_total", &labels).increment(tokens);
    }
}

/// Current number of index entries
pub fn set_index_size(size: usize) {
    gauge!("rag_index_size").set(size as f64);
}

/// Parameters for LLM request metrics
pub struct LlmRequestMetricParams<'a> {
    pub provider: &'a str,
    pub model: &'a str,
    pub duration: Duration,
    pub success: bool,
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
}

/// Sanitize URL path for metric labels (remove IDs, limit cardinality)
fn sanitize_path(path: &str) -> String {
    let path = HEX_ID.replace_all(path, "{id}");
    let path = NUMERIC_ID.replace_all(&path, "/{id}$1");

    if path.len() > 50 {
        path.chars().take(50).collect()
    } else {
        path.to_string()
    }
}
