mod provider;
mod request;
mod response;

pub use provider::LlmProvider;
pub use request::{LlmRequest, LlmRequestBuilder};
pub use response::{LlmResponse, Usage};

#[cfg(test)]
pub use provider::mock::MockLlmProvider;
