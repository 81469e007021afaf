//! Dialogue between two model participants
//!
//! The orchestrator owns turn-taking; participants own their histories; the
//! sink persists each turn as it is produced.

mod error;
mod orchestrator;
mod participant;
mod sink;
mod types;

pub use error::DialogueError;
pub use orchestrator::{DialogueOrchestrator, DialogueSettings};
pub use types::{DialogueOutcome, ExchangeCount, TranscriptEntry};
