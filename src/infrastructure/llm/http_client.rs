use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::domain::DomainError;

/// Transport-level failure; callers translate it into the domain error for their backend
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HttpError {
    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Trait for HTTP client operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, HttpError>;

    async fn get_json(&self, url: &str) -> Result<serde_json::Value, HttpError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn read_json(response: reqwest::Response) -> Result<serde_json::Value, HttpError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HttpError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| HttpError::Decode(e.to_string()))
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, HttpError> {
        let response = self.client.post(url).json(body).send().await?;
        Self::read_json(response).await
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value, HttpError> {
        let response = self.client.get(url).send().await?;
        Self::read_json(response).await
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Mutex, RwLock};

    #[derive(Debug)]
    pub struct MockHttpClient {
        responses: RwLock<HashMap<String, serde_json::Value>>,
        errors: RwLock<HashMap<String, HttpError>>,
        requests: Mutex<Vec<(String, serde_json::Value)>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self {
                responses: RwLock::new(HashMap::new()),
                errors: RwLock::new(HashMap::new()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn with_response(self, url: impl Into<String>, response: serde_json::Value) -> Self {
            self.responses.write().unwrap().insert(url.into(), response);
            self
        }

        pub fn with_error(self, url: impl Into<String>, error: HttpError) -> Self {
            self.errors.write().unwrap().insert(url.into(), error);
            self
        }

        /// Bodies posted so far, with their URLs
        pub fn requests(&self) -> Vec<(String, serde_json::Value)> {
            self.requests.lock().unwrap().clone()
        }

        fn lookup(&self, url: &str) -> Result<serde_json::Value, HttpError> {
            if let Some(error) = self.errors.read().unwrap().get(url) {
                return Err(error.clone());
            }

            self.responses
                .read()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| HttpError::Transport(format!("No mock response for {}", url)))
        }
    }

    impl Default for MockHttpClient {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl HttpClientTrait for MockHttpClient {
        async fn post_json(
            &self,
            url: &str,
            body: &serde_json::Value,
        ) -> Result<serde_json::Value, HttpError> {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), body.clone()));
            self.lookup(url)
        }

        async fn get_json(&self, url: &str) -> Result<serde_json::Value, HttpError> {
            self.lookup(url)
        }
    }
}
