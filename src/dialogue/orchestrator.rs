//! Turn-taking between two participants
//!
//! A run is seeded with the opening prompt in participant 1's history, then
//! alternates participant 1 / participant 2 for the requested number of
//! exchanges. Every reply is appended to the in-memory transcript, written to
//! the transcript file, and fed to the other participant as its next prompt.

use super::participant::Participant;
use super::sink::{decode_newline_escapes, TranscriptSink};
use super::{DialogueError, DialogueOutcome, ExchangeCount, TranscriptEntry};
use crate::llm::ModelGateway;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Per-deployment dialogue settings
#[derive(Debug, Clone)]
pub struct DialogueSettings {
    pub model_1: String,
    pub model_2: String,
    pub opening_prompt: String,
    /// Pause after every turn, to stay under provider rate limits
    pub turn_delay: Duration,
    /// Max messages sent per request; `None` sends the full history
    pub history_window: Option<usize>,
    pub transcript_dir: PathBuf,
}

/// Drives dialogue runs. Holds no per-run state; each `run` builds its own
/// participants, transcript and sink.
pub struct DialogueOrchestrator {
    gateway: Arc<ModelGateway>,
    settings: DialogueSettings,
    cancel: CancellationToken,
}

impl DialogueOrchestrator {
    pub fn new(gateway: Arc<ModelGateway>, settings: DialogueSettings) -> Self {
        Self {
            gateway,
            settings,
            cancel: CancellationToken::new(),
        }
    }

    /// Abort runs at their next pause once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Run one dialogue to completion.
    ///
    /// On failure the transcript file is closed before the error is returned;
    /// turns already written stay in it.
    #[instrument(
        name = "dialogue_run",
        skip_all,
        fields(
            run_id = %uuid::Uuid::new_v4(),
            model_1 = %self.settings.model_1,
            model_2 = %self.settings.model_2,
            num_exchanges = exchanges.get(),
        )
    )]
    pub async fn run(&self, exchanges: ExchangeCount) -> Result<DialogueOutcome, DialogueError> {
        self.execute(exchanges).await
    }

    async fn execute(&self, exchanges: ExchangeCount) -> Result<DialogueOutcome, DialogueError> {
        if self.cancel.is_cancelled() {
            tracing::warn!("Dialogue cancelled before start");
            return Err(DialogueError::Cancelled);
        }

        let started_at = Utc::now();
        let mut first = Participant::seeded(&self.settings.model_1, &self.settings.opening_prompt);
        let mut second = Participant::new(&self.settings.model_2);

        let mut sink = TranscriptSink::open(&self.settings.transcript_dir, started_at).await?;
        let filename = sink.filename().to_string();
        let path = sink.path().to_path_buf();
        tracing::info!(path = %path.display(), "Dialogue started");

        let result = self
            .converse(&mut first, &mut second, &mut sink, exchanges)
            .await;
        let closed = sink.close().await;

        let transcript = match result {
            Ok(transcript) => transcript,
            Err(e) => {
                if let Err(close_err) = closed {
                    tracing::warn!(error = %close_err, "Failed to close transcript after error");
                }
                tracing::error!(error = %e, "Dialogue aborted");
                return Err(e);
            }
        };
        closed?;

        tracing::info!(turns = transcript.len(), "Dialogue completed");
        Ok(DialogueOutcome {
            transcript,
            filename,
            path,
        })
    }

    async fn converse(
        &self,
        first: &mut Participant,
        second: &mut Participant,
        sink: &mut TranscriptSink,
        exchanges: ExchangeCount,
    ) -> Result<Vec<TranscriptEntry>, DialogueError> {
        let rounds = exchanges.get();
        let mut transcript = Vec::with_capacity(rounds as usize * 2);

        sink.write_seed(first.history()).await?;

        for round in 1..=rounds {
            self.take_turn(round, first, second, sink, &mut transcript)
                .await?;
            self.pause().await?;

            self.take_turn(round, second, first, sink, &mut transcript)
                .await?;
            self.pause().await?;
        }

        Ok(transcript)
    }

    /// `speaker` answers its history; the reply becomes `listener`'s prompt
    async fn take_turn(
        &self,
        round: u32,
        speaker: &mut Participant,
        listener: &mut Participant,
        sink: &mut TranscriptSink,
        transcript: &mut Vec<TranscriptEntry>,
    ) -> Result<(), DialogueError> {
        debug_assert!(speaker.awaiting_reply(), "participant asked to answer itself");

        let history = speaker.request_history(self.settings.history_window);
        let reply = self.gateway.generate(speaker.model_id(), history).await?;

        transcript.push(TranscriptEntry {
            speaker: speaker.model_id().to_string(),
            text: decode_newline_escapes(&reply),
        });
        sink.write_turn(speaker.model_id(), &reply).await?;

        tracing::info!(
            round,
            speaker = %speaker.model_id(),
            chars = reply.len(),
            history_len = speaker.history().len(),
            "Turn completed"
        );

        // Histories keep the raw reply; only the transcript is decoded
        speaker.append_assistant(reply.clone());
        listener.append_user(reply);
        Ok(())
    }

    async fn pause(&self) -> Result<(), DialogueError> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                tracing::warn!("Dialogue cancelled during pause");
                Err(DialogueError::Cancelled)
            }
            () = tokio::time::sleep(self.settings.turn_delay) => Ok(()),
        }
    }
}
