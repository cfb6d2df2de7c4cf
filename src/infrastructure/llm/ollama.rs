//! Ollama completion provider (`/api/generate`, non-streaming)

use async_trait::async_trait;
use serde::Deserialize;

use super::http_client::{HttpClientTrait, HttpError};
use crate::domain::llm::{LlmProvider, LlmRequest, LlmResponse, Usage};
use crate::domain::DomainError;

pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3:8b-instruct-q4_K_M";

/// Prompt used to check that the model answers at all
pub const PROBE_PROMPT: &str = "Say 'OK' if you can read this.";

/// Ollama text-completion provider
#[derive(Debug)]
pub struct OllamaProvider<C: HttpClientTrait> {
    client: C,
    base_url: String,
    model: String,
}

impl<C: HttpClientTrait> OllamaProvider<C> {
    /// Create a provider against the default local endpoint
    pub fn new(client: C, model: impl Into<String>) -> Self {
        Self::with_base_url(client, model, DEFAULT_OLLAMA_BASE_URL)
    }

    /// Create a provider with custom base URL
    pub fn with_base_url(client: C, model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }

    fn build_request(&self, request: &LlmRequest) -> serde_json::Value {
        let mut options = serde_json::Map::new();

        if let Some(temperature) = request.temperature {
            options.insert("temperature".into(), serde_json::json!(temperature));
        }

        if let Some(top_p) = request.top_p {
            options.insert("top_p".into(), serde_json::json!(top_p));
        }

        if let Some(top_k) = request.top_k {
            options.insert("top_k".into(), serde_json::json!(top_k));
        }

        if let Some(max_tokens) = request.max_tokens {
            options.insert("num_predict".into(), serde_json::json!(max_tokens));
        }

        serde_json::json!({
            "model": self.model,
            "prompt": request.prompt,
            "stream": false,
            "options": options,
        })
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<LlmResponse, DomainError> {
        let response: OllamaGenerateResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::generation_unavailable(format!("Failed to parse ollama response: {}", e))
        })?;

        let mut result = LlmResponse::new(
            response.model.unwrap_or_else(|| self.model.clone()),
            response.response.trim(),
        );

        if let (Some(prompt), Some(completion)) = (response.prompt_eval_count, response.eval_count) {
            result = result.with_usage(Usage::new(prompt, completion));
        }

        Ok(result)
    }
}

pub(crate) fn generation_error(err: HttpError) -> DomainError {
    match err {
        HttpError::Status { status: 404, body } => {
            DomainError::generation_unavailable(format!("model not found: {}", body))
        }
        other => DomainError::generation_unavailable(format!("ollama: {}", other)),
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for OllamaProvider<C> {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, DomainError> {
        let body = self.build_request(&request);

        let response = self
            .client
            .post_json(&self.generate_url(), &body)
            .await
            .map_err(generation_error)?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Names of models pulled into a local Ollama (`/api/tags`)
pub async fn list_local_models<C: HttpClientTrait>(
    client: &C,
    base_url: &str,
) -> Result<Vec<String>, HttpError> {
    let url = format!("{}/api/tags", base_url.trim_end_matches('/'));
    let json = client.get_json(&url).await?;

    let tags: OllamaTagsResponse =
        serde_json::from_value(json).map_err(|e| HttpError::Decode(e.to_string()))?;

    Ok(tags.models.into_iter().map(|m| m.name).collect())
}

// Ollama API types

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModelTag>,
}

#[derive(Debug, Deserialize)]
struct OllamaModelTag {
    name: String,
}
