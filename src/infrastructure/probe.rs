//! Backend reachability checks for `/debug/llm` and `doctor`

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::domain::{EmbeddingProvider, LlmProvider, LlmRequest};
use crate::infrastructure::llm::PROBE_PROMPT;

/// Result of poking one backend
#[derive(Debug, Clone, Serialize)]
pub struct BackendProbe {
    pub backend: String,
    pub model: String,
    pub ok: bool,
    /// Model output, or the error that prevented one
    pub detail: String,
    pub elapsed_ms: u64,
}

/// Send the fixed probe prompt and report whether the model answered
pub async fn probe_llm(llm: &dyn LlmProvider, timeout: Duration) -> BackendProbe {
    let start = Instant::now();
    let request = LlmRequest::builder(PROBE_PROMPT).max_tokens(16).build();

    let (ok, detail) = match tokio::time::timeout(timeout, llm.complete(request)).await {
        Ok(Ok(response)) if !response.is_blank() => (true, response.text),
        Ok(Ok(_)) => (false, "model returned an empty response".to_string()),
        Ok(Err(e)) => (false, e.to_string()),
        Err(_) => (false, format!("no response within {}s", timeout.as_secs())),
    };

    BackendProbe {
        backend: llm.provider_name().to_string(),
        model: llm.model_name().to_string(),
        ok,
        detail,
        elapsed_ms: start.elapsed().as_millis() as u64,
    }
}

/// Embed a short text and report the vector size
pub async fn probe_embedder(embedder: &dyn EmbeddingProvider, timeout: Duration) -> BackendProbe {
    let start = Instant::now();

    let (ok, detail) = match tokio::time::timeout(timeout, embedder.embed(PROBE_PROMPT)).await {
        Ok(Ok(embedding)) => (true, format!("{} dimensions", embedding.dimensions())),
        Ok(Err(e)) => (false, e.to_string()),
        Err(_) => (false, format!("no response within {}s", timeout.as_secs())),
    };

    BackendProbe {
        backend: embedder.provider_name().to_string(),
        model: embedder.model_name().to_string(),
        ok,
        detail,
        elapsed_ms: start.elapsed().as_millis() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::llm::MockLlmProvider;

    #[tokio::test]
    async fn test_probe_llm_ok() {
        let llm = MockLlmProvider::new().with_response("OK");

        let probe = probe_llm(&llm, Duration::from_secs(5)).await;

        assert!(probe.ok);
        assert_eq!(probe.detail, "OK");
        assert_eq!(llm.prompts(), vec![PROBE_PROMPT.to_string()]);
    }

    #[tokio::test]
    async fn test_probe_llm_failure() {
        let llm = MockLlmProvider::new().with_error("connection refused");

        let probe = probe_llm(&llm, Duration::from_secs(5)).await;

        assert!(!probe.ok);
        assert!(probe.detail.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_probe_llm_timeout() {
        let llm = MockLlmProvider::new()
            .with_response("OK")
            .with_delay(Duration::from_secs(3));

        let probe = probe_llm(&llm, Duration::from_secs(1)).await;

        assert!(!probe.ok);
        assert!(probe.detail.contains("within 1s"));
    }

    #[tokio::test]
    async fn test_probe_embedder() {
        let ok = probe_embedder(&MockEmbeddingProvider::new(24), Duration::from_secs(1)).await;
        let down = probe_embedder(
            &MockEmbeddingProvider::new(24).with_error("unreachable"),
            Duration::from_secs(1),
        )
        .await;

        assert!(ok.ok);
        assert_eq!(ok.detail, "24 dimensions");
        assert!(!down.ok);
    }
}
