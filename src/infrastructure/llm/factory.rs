use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::http_client::HttpClient;
use super::ollama::{OllamaProvider, DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL};
use crate::domain::{DomainError, LlmProvider};

/// LLM provider configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LlmProviderConfig {
    Ollama {
        #[serde(default = "default_base_url")]
        base_url: String,
        #[serde(default = "default_model")]
        model: String,
    },
}

fn default_base_url() -> String {
    DEFAULT_OLLAMA_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_OLLAMA_MODEL.to_string()
}

impl Default for LlmProviderConfig {
    fn default() -> Self {
        Self::Ollama {
            base_url: default_base_url(),
            model: default_model(),
        }
    }
}

/// Factory for creating LLM providers
#[derive(Debug)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create an LLM provider from configuration. `timeout` bounds each HTTP call.
    pub fn create(
        config: &LlmProviderConfig,
        timeout: Duration,
    ) -> Result<Arc<dyn LlmProvider>, DomainError> {
        let http_client = HttpClient::with_timeout(timeout)?;

        match config {
            LlmProviderConfig::Ollama { base_url, model } => {
                if model.trim().is_empty() {
                    return Err(DomainError::configuration("llm model cannot be empty"));
                }

                Ok(Arc::new(OllamaProvider::with_base_url(
                    http_client,
                    model.clone(),
                    base_url.clone(),
                )))
            }
        }
    }

    /// Create an Ollama provider against the default local endpoint
    pub fn create_ollama(model: impl Into<String>) -> Arc<dyn LlmProvider> {
        Arc::new(OllamaProvider::new(HttpClient::new(), model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_from_config() {
        let provider =
            LlmProviderFactory::create(&LlmProviderConfig::default(), Duration::from_secs(5))
                .unwrap();

        assert_eq!(provider.provider_name(), "ollama");
        assert_eq!(provider.model_name(), DEFAULT_OLLAMA_MODEL);
    }

    #[test]
    fn test_config_deserialization_defaults() {
        let config: LlmProviderConfig =
            serde_json::from_value(serde_json::json!({ "type": "ollama" })).unwrap();

        let LlmProviderConfig::Ollama { base_url, model } = config;
        assert_eq!(base_url, "http://localhost:11434");
        assert_eq!(model, "llama3:8b-instruct-q4_K_M");
    }

    #[test]
    fn test_empty_model_rejected() {
        let config = LlmProviderConfig::Ollama {
            base_url: default_base_url(),
            model: " ".to_string(),
        };

        let result = LlmProviderFactory::create(&config, Duration::from_secs(5));
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}
