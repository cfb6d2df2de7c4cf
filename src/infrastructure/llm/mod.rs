//! LLM provider implementations

mod factory;
pub(crate) mod http_client;
mod ollama;

pub use factory::{LlmProviderConfig, LlmProviderFactory};
pub use http_client::{HttpClient, HttpClientTrait, HttpError};
pub use ollama::{
    list_local_models, OllamaProvider, DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL,
    PROBE_PROMPT,
};
