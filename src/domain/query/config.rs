use serde::{Deserialize, Serialize};

use crate::domain::llm::{LlmRequest, LlmRequestBuilder};
use crate::domain::DomainError;

/// Sampling options forwarded to the completion backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 700,
            top_p: 0.9,
            top_k: 40,
        }
    }
}

impl GenerationOptions {
    pub fn request(&self, prompt: impl Into<String>) -> LlmRequest {
        LlmRequestBuilder::new(prompt)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .top_p(self.top_p)
            .top_k(self.top_k)
            .build()
    }
}

/// Configuration for answering questions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Chunks retrieved per question
    pub top_k: usize,
    /// Minimum score a chunk needs to be used; `None` keeps the raw top-k
    pub relevance_floor: Option<f32>,
    /// Prompt budget in characters
    pub max_prompt_length: usize,
    pub max_history_turns: usize,
    pub generation: GenerationOptions,
    /// Upper bound on a single completion call
    pub generation_timeout_secs: u64,
    /// Retry a failed completion once with the identical prompt
    pub retry_once: bool,
    /// Upper bound on answering one question end to end
    pub timeout_secs: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            top_k: 6,
            relevance_floor: None,
            max_prompt_length: 12_000,
            max_history_turns: 8,
            generation: GenerationOptions::default(),
            generation_timeout_secs: 120,
            retry_once: true,
            timeout_secs: 300,
        }
    }
}

impl QueryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_relevance_floor(mut self, floor: f32) -> Self {
        self.relevance_floor = Some(floor);
        self
    }

    pub fn with_max_prompt_length(mut self, length: usize) -> Self {
        self.max_prompt_length = length;
        self
    }

    pub fn with_retry_once(mut self, retry: bool) -> Self {
        self.retry_once = retry;
        self
    }

    pub fn with_generation_timeout_secs(mut self, secs: u64) -> Self {
        self.generation_timeout_secs = secs;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.top_k == 0 {
            return Err(DomainError::validation("top_k must be greater than 0"));
        }

        if self.max_prompt_length == 0 {
            return Err(DomainError::validation(
                "max_prompt_length must be greater than 0",
            ));
        }

        if self.generation_timeout_secs == 0 || self.timeout_secs == 0 {
            return Err(DomainError::validation("timeouts must be greater than 0"));
        }

        Ok(())
    }
}
