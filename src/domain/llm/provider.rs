use async_trait::async_trait;
use std::fmt::Debug;

use super::{LlmRequest, LlmResponse};
use crate::domain::DomainError;

/// Trait for text-completion backends (Ollama, etc.)
///
/// Backend failures are reported as `GenerationUnavailable`.
#[async_trait]
pub trait LlmProvider: Send + Sync + Debug {
    /// Complete a prompt
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Model used for completions
    fn model_name(&self) -> &str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays queued outcomes in order, then falls back to the default response
    #[derive(Debug)]
    pub struct MockLlmProvider {
        queue: Mutex<VecDeque<Result<LlmResponse, String>>>,
        response: Option<LlmResponse>,
        error: Option<String>,
        delay: Option<Duration>,
        prompts: Mutex<Vec<String>>,
    }

    impl MockLlmProvider {
        pub fn new() -> Self {
            Self {
                queue: Mutex::new(VecDeque::new()),
                response: None,
                error: None,
                delay: None,
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn with_response(mut self, text: impl Into<String>) -> Self {
            self.response = Some(LlmResponse::new("mock-model", text));
            self
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Queue a one-off outcome ahead of the default behaviour
        pub fn then(self, outcome: Result<&str, &str>) -> Self {
            self.queue.lock().unwrap().push_back(
                outcome
                    .map(|text| LlmResponse::new("mock-model", text))
                    .map_err(str::to_string),
            );
            self
        }

        /// Prompts received so far
        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    impl Default for MockLlmProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl LlmProvider for MockLlmProvider {
        async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, DomainError> {
            self.prompts.lock().unwrap().push(request.prompt);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            let queued = self.queue.lock().unwrap().pop_front();
            if let Some(outcome) = queued {
                return outcome.map_err(DomainError::generation_unavailable);
            }

            if let Some(ref error) = self.error {
                return Err(DomainError::generation_unavailable(error));
            }

            self.response
                .clone()
                .ok_or_else(|| DomainError::generation_unavailable("No mock response configured"))
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }

        fn model_name(&self) -> &str {
            "mock-model"
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_queue_then_default() {
            let provider = MockLlmProvider::new()
                .with_response("default")
                .then(Err("boom"));

            assert!(provider.complete(LlmRequest::new("a")).await.is_err());
            let response = provider.complete(LlmRequest::new("b")).await.unwrap();

            assert_eq!(response.text, "default");
            assert_eq!(provider.prompts(), vec!["a", "b"]);
        }
    }
}
