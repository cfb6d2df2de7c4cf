use serde::{Deserialize, Serialize};

/// A single text-completion request. The prompt is already fully assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

impl LlmRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: None,
            max_tokens: None,
            top_p: None,
            top_k: None,
        }
    }

    pub fn builder(prompt: impl Into<String>) -> LlmRequestBuilder {
        LlmRequestBuilder::new(prompt)
    }
}

/// Builder for LlmRequest
#[derive(Debug)]
pub struct LlmRequestBuilder {
    request: LlmRequest,
}

impl LlmRequestBuilder {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            request: LlmRequest::new(prompt),
        }
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.request.temperature = Some(temp);
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.request.max_tokens = Some(tokens);
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.request.top_p = Some(top_p);
        self
    }

    pub fn top_k(mut self, top_k: u32) -> Self {
        self.request.top_k = Some(top_k);
        self
    }

    pub fn build(self) -> LlmRequest {
        self.request
    }
}
