//! API request and response types

use crate::dialogue::{ExchangeCount, TranscriptEntry};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request to run a dialogue.
///
/// Parsed leniently: anything that is not a usable number falls back to the
/// default exchange count rather than failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub num_exchanges: Option<Value>,
}

impl RunRequest {
    /// Parse a raw body; a missing or malformed body is an empty request
    pub fn from_body(body: &[u8]) -> Self {
        if body.is_empty() {
            return Self::default();
        }
        serde_json::from_slice(body).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Ignoring malformed run request body");
            Self::default()
        })
    }

    /// Requested exchange count, clamped into range
    pub fn exchange_count(&self) -> ExchangeCount {
        self.num_exchanges
            .as_ref()
            .and_then(requested_count)
            .map_or(ExchangeCount::DEFAULT, ExchangeCount::clamped)
    }
}

/// Integers, integral strings, floats (truncated) and booleans (`true` = 1, `false` = 0)
/// are accepted
#[allow(clippy::cast_possible_truncation)]
fn requested_count(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                // `as` saturates, and the result is clamped afterwards anyway
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

/// Response for a completed run
#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub transcript: Vec<TranscriptEntry>,
    pub filename: String,
}

/// Liveness probe response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
