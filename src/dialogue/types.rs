//! Values produced and consumed by a dialogue run

use serde::Serialize;
use std::path::PathBuf;

/// Number of exchange rounds, always within `[MIN, MAX]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeCount(u32);

impl ExchangeCount {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 20;
    pub const DEFAULT: ExchangeCount = ExchangeCount(6);

    /// Clamp any requested count into range
    pub fn clamped(requested: i64) -> Self {
        let clamped = requested.clamp(i64::from(Self::MIN), i64::from(Self::MAX));
        // In range by construction, so the conversion cannot fail
        Self(u32::try_from(clamped).unwrap_or(Self::MIN))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for ExchangeCount {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One generated turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    /// Model id of the participant that produced `text`
    pub speaker: String,
    pub text: String,
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct DialogueOutcome {
    /// Every generated turn in order, two per exchange
    pub transcript: Vec<TranscriptEntry>,
    /// Transcript file name, e.g. `conversation_1700000000.txt`
    pub filename: String,
    pub path: PathBuf,
}
