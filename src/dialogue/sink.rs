//! Transcript file written incrementally while a dialogue runs
//!
//! File format is a sequence of UTF-8 blocks:
//!
//! ```text
//! <Label>
//! content
//!
//! ```
//!
//! where `Label` is the capitalized role for seed messages and the raw model
//! id for generated turns.

use crate::llm::LlmMessage;
use chrono::{DateTime, Utc};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

/// Replace literal `\n` escape sequences with real newlines.
///
/// Idempotent: decoding never produces a new backslash-`n` pair.
pub fn decode_newline_escapes(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// Transcript file name for a run started at `started_at`
pub fn transcript_filename(started_at: DateTime<Utc>) -> String {
    format!("conversation_{}.txt", started_at.timestamp())
}

/// Open transcript file, exclusively owned by one run
pub struct TranscriptSink {
    file: File,
    filename: String,
    path: PathBuf,
}

impl TranscriptSink {
    /// Create the run's transcript file under `dir`.
    ///
    /// Runs starting within the same second share a name; the later one
    /// truncates the earlier file.
    pub async fn open(dir: &Path, started_at: DateTime<Utc>) -> io::Result<Self> {
        fs::create_dir_all(dir).await?;
        let filename = transcript_filename(started_at);
        let path = dir.join(&filename);
        let file = File::create(&path).await?;
        tracing::debug!(path = %path.display(), "Opened transcript file");
        Ok(Self {
            file,
            filename,
            path,
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the opening messages, labeled by role
    pub async fn write_seed(&mut self, messages: &[LlmMessage]) -> io::Result<()> {
        for message in messages {
            self.write_block(message.role.label(), &message.content).await?;
        }
        Ok(())
    }

    /// Write one generated turn, labeled by the speaking model id
    pub async fn write_turn(&mut self, speaker: &str, text: &str) -> io::Result<()> {
        self.write_block(speaker, text).await
    }

    async fn write_block(&mut self, label: &str, content: &str) -> io::Result<()> {
        let block = format!("<{label}>\n{}\n\n", decode_newline_escapes(content));
        self.file.write_all(block.as_bytes()).await?;
        // Each block lands on disk before the next turn starts
        self.file.flush().await
    }

    /// Flush and release the file
    pub async fn close(mut self) -> io::Result<()> {
        self.file.flush().await?;
        self.file.sync_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn started() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_decode_literal_escapes() {
        assert_eq!(decode_newline_escapes("a\\nb"), "a\nb");
        assert_eq!(decode_newline_escapes("a\nb"), "a\nb");
        assert_eq!(decode_newline_escapes("\\\\n"), "\\\n");
        assert_eq!(decode_newline_escapes(""), "");
    }

    #[test]
    fn test_filename_uses_unix_seconds() {
        assert_eq!(transcript_filename(started()), "conversation_1700000000.txt");
    }

    #[tokio::test]
    async fn test_blocks_written_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = TranscriptSink::open(dir.path(), started()).await.unwrap();
        assert_eq!(sink.filename(), "conversation_1700000000.txt");

        sink.write_seed(&[LlmMessage::user("Define enlightenment.")])
            .await
            .unwrap();
        sink.write_turn("gpt-4", "Line one\\nLine two").await.unwrap();
        sink.write_turn("claude-3-opus-20240229", "Reply").await.unwrap();
        let path = sink.path().to_path_buf();
        sink.close().await.unwrap();

        let written = std::fs::read_to_string(path).unwrap();
        assert_eq!(
            written,
            "<User>\nDefine enlightenment.\n\n\
             <gpt-4>\nLine one\nLine two\n\n\
             <claude-3-opus-20240229>\nReply\n\n"
        );
    }

    #[tokio::test]
    async fn test_turns_visible_before_close() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = TranscriptSink::open(dir.path(), started()).await.unwrap();
        sink.write_turn("gpt-4", "partial").await.unwrap();

        // Dropped without close, as after a failed run
        let path = sink.path().to_path_buf();
        drop(sink);
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<gpt-4>\npartial\n\n");
    }

    #[tokio::test]
    async fn test_open_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("transcripts").join("today");
        let sink = TranscriptSink::open(&nested, started()).await.unwrap();
        assert!(sink.path().starts_with(&nested));
        sink.close().await.unwrap();
        assert!(nested.join("conversation_1700000000.txt").exists());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn prop_decode_is_idempotent(text in "[a-z\\\\n \n]{0,64}") {
            let once = decode_newline_escapes(&text);
            prop_assert_eq!(decode_newline_escapes(&once), once.clone());
            prop_assert!(!once.contains("\\n"));
        }
    }
}
