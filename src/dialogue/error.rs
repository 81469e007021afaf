//! Dialogue run errors

use crate::llm::GatewayError;
use std::io;
use thiserror::Error;

/// Anything that ends a run early. None of these are retried.
#[derive(Debug, Error)]
pub enum DialogueError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Transcript write failed: {0}")]
    Sink(#[from] io::Error),

    #[error("Dialogue cancelled")]
    Cancelled,
}
