//! Doctor command - checks that the model backends are reachable and answering

use std::time::Duration;

use clap::Args;
use serde::Serialize;

use crate::config::{AppConfig, EmbeddingBackend};
use crate::domain::{EmbeddingProvider, LlmProvider};
use crate::infrastructure::embedding::EmbeddingProviderFactory;
use crate::infrastructure::llm::{list_local_models, HttpClient, LlmProviderFactory};
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::probe::{probe_embedder, probe_llm, BackendProbe};

#[derive(Args, Debug, Default)]
pub struct DoctorArgs {
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct DoctorReport {
    pub embedding: BackendProbe,
    pub llm: BackendProbe,
    /// Configured models that the Ollama server has not pulled
    pub missing_models: Vec<String>,
}

impl DoctorReport {
    pub fn is_healthy(&self) -> bool {
        self.embedding.ok && self.llm.ok && self.missing_models.is_empty()
    }
}

pub async fn run(args: DoctorArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    let embedder = EmbeddingProviderFactory::create(
        &config.embedding_provider_config(),
        config.embedding_timeout(),
    )?;
    let llm = LlmProviderFactory::create(&config.llm_provider_config(), config.llm_timeout())?;

    let mut report = diagnose(embedder.as_ref(), llm.as_ref(), config.llm_timeout()).await;
    report.missing_models = missing_ollama_models(&config).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_probe("embedding", &report.embedding);
        print_probe("llm", &report.llm);
        for model in &report.missing_models {
            println!("[FAIL] model {} is not pulled; run `ollama pull {}`", model, model);
        }
    }

    if !report.is_healthy() {
        anyhow::bail!("one or more backends are not ready");
    }

    Ok(())
}

/// Probe both backends
pub async fn diagnose(
    embedder: &dyn EmbeddingProvider,
    llm: &dyn LlmProvider,
    timeout: Duration,
) -> DoctorReport {
    let (embedding, llm) = tokio::join!(probe_embedder(embedder, timeout), probe_llm(llm, timeout));

    DoctorReport {
        embedding,
        llm,
        missing_models: Vec::new(),
    }
}

async fn missing_ollama_models(config: &AppConfig) -> Vec<String> {
    let client = match HttpClient::with_timeout(Duration::from_secs(10)) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, "Cannot build HTTP client for model listing");
            return Vec::new();
        }
    };

    let available = match list_local_models(&client, &config.llm.base_url).await {
        Ok(models) => models,
        // Unreachable servers already fail the probes
        Err(e) => {
            tracing::debug!(error = %e, "Model listing unavailable");
            return Vec::new();
        }
    };

    let mut wanted = vec![config.llm.model.as_str()];
    if config.embedding.provider == EmbeddingBackend::Ollama
        && config.embedding.base_url == config.llm.base_url
    {
        wanted.push(config.embedding.model.as_str());
    }

    missing_models(&wanted, &available)
}

/// Models in `wanted` absent from `available`; an untagged name matches `:latest`
fn missing_models(wanted: &[&str], available: &[String]) -> Vec<String> {
    wanted
        .iter()
        .filter(|model| {
            !available.iter().any(|name| {
                name == *model
                    || (!model.contains(':') && name.as_str() == format!("{}:latest", model))
            })
        })
        .map(|model| model.to_string())
        .collect()
}

fn print_probe(label: &str, probe: &BackendProbe) {
    let status = if probe.ok { "OK" } else { "FAIL" };
    println!(
        "[{}] {} ({} {}) in {}ms: {}",
        status, label, probe.backend, probe.model, probe.elapsed_ms, probe.detail
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::llm::MockLlmProvider;

    #[test]
    fn test_missing_models() {
        let available = vec![
            "llama3:8b-instruct-q4_K_M".to_string(),
            "nomic-embed-text:latest".to_string(),
        ];

        assert!(missing_models(&["llama3:8b-instruct-q4_K_M", "nomic-embed-text"], &available)
            .is_empty());
        assert_eq!(
            missing_models(&["mistral:7b", "nomic-embed-text"], &available),
            vec!["mistral:7b".to_string()]
        );
    }

    #[tokio::test]
    async fn test_diagnose_healthy() {
        let embedder = MockEmbeddingProvider::new(16);
        let llm = MockLlmProvider::new().with_response("OK");

        let report = diagnose(&embedder, &llm, Duration::from_secs(5)).await;

        assert!(report.is_healthy());
        assert_eq!(report.embedding.detail, "16 dimensions");
    }

    #[tokio::test]
    async fn test_diagnose_reports_failing_llm() {
        let embedder = MockEmbeddingProvider::new(16);
        let llm = MockLlmProvider::new().with_error("connection refused");

        let report = diagnose(&embedder, &llm, Duration::from_secs(5)).await;

        assert!(!report.is_healthy());
        assert!(report.embedding.ok);
        assert!(!report.llm.ok);
    }
}
