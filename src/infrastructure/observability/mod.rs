//! Observability infrastructure - Prometheus metrics

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::{
    create_metrics_router, init_metrics, record_document_ingested, record_http_request,
    record_llm_request, record_query, set_index_size, LlmRequestMetricParams, PrometheusMetrics,
};
