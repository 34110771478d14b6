//! File-backed conversation store with summarize-and-truncate compression.
//!
//! The log is persisted as a UTF-8 JSON array of messages. Durability is
//! best-effort in both directions: a missing or unparseable file loads as
//! an empty log with a warning, and a failed save is warned about and
//! swallowed — losing memory beats crashing mid-conversation.
//!
//! Saves go through a sibling temp file plus rename, so a crash mid-write
//! never leaves a half-written log for the next load to trip over.

use std::path::{Path, PathBuf};

use studyclaw_core::error::MemoryError;
use studyclaw_core::message::{Conversation, Message, Role};
use tracing::{debug, warn};

/// Prefix for the synthetic system message that compression inserts in
/// place of the discarded history.
const SUMMARY_PREFIX: &str = "[Previous conversation summary]";

/// A conversation log bound to one file on disk.
///
/// The store holds no message state itself; it is a cheap handle (path +
/// thresholds) that the agent loop and the CLI can both clone.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    path: PathBuf,
    threshold_bytes: usize,
    keep_last_n: usize,
}

impl ConversationStore {
    /// Create a store for the given file.
    ///
    /// `threshold_bytes` is the serialized size above which compression
    /// triggers; `keep_last_n` is how many trailing messages survive it.
    pub fn new(path: impl Into<PathBuf>, threshold_bytes: usize, keep_last_n: usize) -> Self {
        Self {
            path: path.into(),
            threshold_bytes,
            keep_last_n,
        }
    }

    /// The file this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// How many trailing messages compression retains.
    pub fn retain_count(&self) -> usize {
        self.keep_last_n
    }

    /// Load the persisted log.
    ///
    /// A missing file is a normal first run; a corrupt file is degraded to
    /// an empty log with a warning. Neither is an error.
    pub fn load(&self) -> Conversation {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return Conversation::new(),
        };

        match serde_json::from_str(&content) {
            Ok(messages) => {
                let conversation = Conversation::from_messages(messages);
                debug!(
                    path = %self.path.display(),
                    count = conversation.len(),
                    "Conversation log loaded"
                );
                conversation
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Could not parse conversation log, starting fresh"
                );
                Conversation::new()
            }
        }
    }

    /// Persist the log, atomically replacing the previous file.
    ///
    /// Failures are warned about and swallowed.
    pub fn save(&self, conversation: &Conversation) {
        if let Err(e) = self.try_save(conversation) {
            warn!(path = %self.path.display(), error = %e, "Could not save conversation log");
        }
    }

    /// Persist the log, surfacing the failure to the caller.
    pub fn try_save(&self, conversation: &Conversation) -> Result<(), MemoryError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)
            .map_err(|e| MemoryError::Storage(format!("Failed to create memory directory: {e}")))?;

        let json = serde_json::to_string_pretty(conversation)
            .map_err(|e| MemoryError::Storage(format!("Failed to serialize conversation: {e}")))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&parent)
            .map_err(|e| MemoryError::Storage(format!("Failed to stage memory file: {e}")))?;
        std::io::Write::write_all(&mut tmp, json.as_bytes())
            .map_err(|e| MemoryError::Storage(format!("Failed to write memory file: {e}")))?;
        tmp.persist(&self.path)
            .map_err(|e| MemoryError::Storage(format!("Failed to replace memory file: {e}")))?;
        Ok(())
    }

    /// Byte length of the log's canonical serialized form.
    ///
    /// A cheap proxy for token pressure, not an exact token count.
    pub fn size_bytes(&self, conversation: &Conversation) -> usize {
        match serde_json::to_vec(conversation) {
            Ok(bytes) => bytes.len(),
            Err(e) => {
                warn!(error = %e, "Could not measure conversation log");
                0
            }
        }
    }

    /// Whether the log has outgrown the configured threshold.
    ///
    /// Strictly greater than: a log sitting exactly at the threshold does
    /// not compress.
    pub fn should_compress(&self, conversation: &Conversation) -> bool {
        self.size_bytes(conversation) > self.threshold_bytes
    }

    /// Replace everything but the last `keep_last_n` messages with a
    /// single synthetic summary message.
    ///
    /// A log that fits in the tail is returned unchanged — there is
    /// nothing to summarize.
    pub fn compress(&self, conversation: &Conversation, summary: &str) -> Conversation {
        if conversation.len() <= self.keep_last_n {
            return conversation.clone();
        }

        let tail_start = conversation.len() - self.keep_last_n;
        let mut messages = Vec::with_capacity(self.keep_last_n + 1);
        messages.push(Message::system(format!("{SUMMARY_PREFIX}: {summary}")));
        messages.extend_from_slice(&conversation.messages[tail_start..]);

        debug!(
            discarded = tail_start,
            retained = self.keep_last_n,
            "Conversation log compressed"
        );
        Conversation::from_messages(messages)
    }

    /// Render the messages that `compress` would discard as `ROLE: content`
    /// lines, for the summarization request.
    ///
    /// Messages with no text (assistant turns that only carry tool calls)
    /// are skipped.
    pub fn transcript_before_tail(&self, conversation: &Conversation) -> String {
        if conversation.len() <= self.keep_last_n {
            return String::new();
        }

        let tail_start = conversation.len() - self.keep_last_n;
        let mut lines = Vec::new();
        for message in &conversation.messages[..tail_start] {
            if message.content.is_empty() {
                continue;
            }
            let role = match message.role {
                Role::User => "USER",
                Role::Assistant => "ASSISTANT",
                Role::System => "SYSTEM",
                Role::Tool => "TOOL",
            };
            lines.push(format!("{role}: {}", message.content));
        }
        lines.join("\n")
    }
}
