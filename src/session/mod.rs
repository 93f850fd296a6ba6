pub mod models;

use std::collections::VecDeque;

use chrono::Utc;
use models::{HistoryEntry, HistoryItem, Message, Role, SessionFlags, UploadedFile};

/// Maximum number of recorded turns kept as gateway context.
pub const HISTORY_LIMIT: usize = 20;

pub const GREETING: &str = "Hello! I'm Pulse AI, your spreadsheet analysis assistant. \
Upload an Excel file (.xlsx or .xls) and ask me anything about it.";

/// Owns the transcript, the history window and the single active file.
///
/// Every operation is synchronous and total. Preconditions such as "only one
/// active file" are enforced by the callers in `commands`, not here.
#[derive(Debug, Clone)]
pub struct SessionStore {
    messages: Vec<Message>,
    history: VecDeque<HistoryItem>,
    active_file: Option<UploadedFile>,
    pub flags: SessionFlags,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            messages: vec![Message::assistant(GREETING)],
            history: VecDeque::with_capacity(HISTORY_LIMIT),
            active_file: None,
            flags: SessionFlags::default(),
        }
    }

    // ── Transcript ──

    pub fn append_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Appends both messages and pushes the pair onto the history window,
    /// dropping the oldest turns beyond `HISTORY_LIMIT`.
    pub fn record_turn(&mut self, user: Message, assistant: Message) {
        self.history.push_back(HistoryItem {
            user: user.content.clone(),
            user_timestamp: user.timestamp,
            assistant: assistant.content.clone(),
            assistant_timestamp: assistant.timestamp,
        });
        while self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.messages.push(user);
        self.messages.push(assistant);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    // ── History window ──

    pub fn history(&self) -> impl Iterator<Item = &HistoryItem> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// The window flattened to alternating user/assistant lines, oldest first.
    pub fn history_entries(&self) -> Vec<HistoryEntry> {
        self.history
            .iter()
            .flat_map(|item| {
                [
                    HistoryEntry {
                        role: Role::User,
                        content: item.user.clone(),
                        timestamp: item.user_timestamp,
                    },
                    HistoryEntry {
                        role: Role::Assistant,
                        content: item.assistant.clone(),
                        timestamp: item.assistant_timestamp,
                    },
                ]
            })
            .collect()
    }

    // ── Active file ──

    pub fn set_active_file(&mut self, file: Option<UploadedFile>) {
        self.active_file = file;
    }

    pub fn active_file(&self) -> Option<&UploadedFile> {
        self.active_file.as_ref()
    }

    pub fn upload_id(&self) -> Option<&str> {
        self.active_file.as_ref().and_then(UploadedFile::chat_id)
    }

    pub fn can_chat(&self) -> bool {
        self.upload_id().is_some() && !self.flags.is_loading
    }

    pub fn can_upload(&self) -> bool {
        self.active_file.is_none() && !self.flags.is_uploading
    }

    /// Back to a fresh greeting with no history and no file.
    pub fn reset_session(&mut self) {
        self.messages.clear();
        self.messages.push(Message {
            role: Role::Assistant,
            content: GREETING.to_string(),
            timestamp: Utc::now(),
        });
        self.history.clear();
        self.active_file = None;
    }
}
