//! One side of the dialogue: a model id and its own message history

use crate::llm::{LlmMessage, MessageRole};

/// A participant owns its history exclusively; nothing else appends to it.
#[derive(Debug, Clone)]
pub struct Participant {
    model_id: String,
    history: Vec<LlmMessage>,
}

impl Participant {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            history: Vec::new(),
        }
    }

    /// Participant whose history starts with one user message
    pub fn seeded(model_id: impl Into<String>, opening: impl Into<String>) -> Self {
        let mut participant = Self::new(model_id);
        participant.append_user(opening);
        participant
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn history(&self) -> &[LlmMessage] {
        &self.history
    }

    /// Record text this participant's own model just produced
    pub fn append_assistant(&mut self, text: impl Into<String>) {
        self.history.push(LlmMessage::assistant(text));
    }

    /// Record the peer's output as this participant's next prompt
    pub fn append_user(&mut self, text: impl Into<String>) {
        self.history.push(LlmMessage::user(text));
    }

    /// True when the last message is addressed to this participant
    pub fn awaiting_reply(&self) -> bool {
        self.history.last().map(|m| m.role) == Some(MessageRole::User)
    }

    /// Messages to send on the next request.
    ///
    /// Without a window this is the whole history, which grows without bound
    /// across rounds. With `Some(n)` only the last `n` messages are sent, and
    /// leading assistant messages are dropped so the slice opens on a user turn.
    /// The stored history is never truncated.
    pub fn request_history(&self, window: Option<usize>) -> &[LlmMessage] {
        let Some(window) = window else {
            return &self.history;
        };

        let start = self.history.len().saturating_sub(window);
        let tail = &self.history[start..];
        let first_user = tail
            .iter()
            .position(|m| m.role == MessageRole::User)
            .unwrap_or(tail.len());
        &tail[first_user..]
    }
}
