//! LLM provider abstraction
//!
//! Provides a common interface over the supported providers and the gateway
//! that routes each model id to one of them.

mod anthropic;
mod error;
mod gateway;
mod models;
mod openai;
mod types;

#[cfg(test)]
pub mod testing;

pub use anthropic::AnthropicService;
pub use error::{GatewayError, LlmError, LlmErrorKind};
pub use gateway::{LlmConfig, ModelGateway};
pub use models::Provider;
pub use openai::OpenAIService;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a completion request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Provider this client talks to
    fn provider(&self) -> Provider;
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    provider = %self.inner.provider(),
                    model = %request.model,
                    messages = request.messages.len(),
                    duration_ms = %duration.as_millis(),
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    end_turn = response.end_turn,
                    "LLM request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    provider = %self.inner.provider(),
                    model = %request.model,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    retryable = e.kind.is_retryable(),
                    "LLM request failed"
                );
            }
        }

        result
    }

    fn provider(&self) -> Provider {
        self.inner.provider()
    }
}
