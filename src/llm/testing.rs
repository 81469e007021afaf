//! Mock provider clients for testing
//!
//! These mocks stand in for real transports so the gateway and the dialogue
//! orchestrator can be exercised without network I/O.

use super::{LlmError, LlmRequest, LlmResponse, LlmService, Provider};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Mock provider client that returns queued responses in order
pub struct MockLlmService {
    provider: Provider,
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    /// Record of all requests made
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmService {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a plain-text response
    pub fn queue_text(&self, text: &str) {
        self.queue_response(LlmResponse::text_only(text));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn provider(&self) -> Provider {
        self.provider
    }
}
