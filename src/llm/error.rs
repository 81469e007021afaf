//! LLM error types

use super::Provider;
use std::time::Duration;
use thiserror::Error;

/// LLM transport error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
    pub retry_after: Option<Duration>,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn with_retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Network, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::RateLimit, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::ServerError, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Auth, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::InvalidRequest, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Unknown, message)
    }

    /// Map a reqwest send failure onto our classification
    pub fn from_send(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::network(format!("Request timeout: {e}"))
        } else if e.is_connect() {
            LlmError::network(format!("Connection failed: {e}"))
        } else {
            LlmError::unknown(format!("Request failed: {e}"))
        }
    }

    /// Classify a non-success HTTP status and body
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 | 403 => LlmError::auth(format!("Authentication failed: {body}")),
            429 => {
                let mut err = LlmError::rate_limit(format!("Rate limited: {body}"));
                if let Some(retry_after) = serde_json::from_str::<serde_json::Value>(body)
                    .ok()
                    .and_then(|parsed| {
                        parsed
                            .get("error")
                            .and_then(|e| e.get("retry_after"))
                            .and_then(serde_json::Value::as_f64)
                    })
                    .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                {
                    err = err.with_retry_after(retry_after);
                }
                err
            }
            400 => LlmError::invalid_request(format!("Invalid request: {body}")),
            500..=599 => LlmError::server_error(format!("Server error: {body}")),
            _ => LlmError::unknown(format!("HTTP {status}: {body}")),
        }
    }
}

/// Error classification. Nothing retries today; the flag is logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Network issues, timeouts
    Network,
    /// Rate limited (429)
    RateLimit,
    /// Server error (5xx)
    ServerError,
    /// Authentication failed (401, 403)
    Auth,
    /// Bad request (400)
    InvalidRequest,
    /// Unknown error, including unparseable responses
    Unknown,
}

impl LlmErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::RateLimit | Self::ServerError)
    }
}

/// Errors raised by [`super::ModelGateway`]
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),

    #[error("{model_id} requires {} or LLM_GATEWAY", .provider.api_key_env_var())]
    ProviderNotConfigured { model_id: String, provider: Provider },

    #[error("{model_id}: {reason}")]
    InvalidHistory { model_id: String, reason: &'static str },

    #[error(transparent)]
    Transport(#[from] LlmError),
}
