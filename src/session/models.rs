use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single transcript line. Never mutated after it is appended.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// One recorded turn in the history window.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HistoryItem {
    pub user: String,
    pub user_timestamp: DateTime<Utc>,
    pub assistant: String,
    pub assistant_timestamp: DateTime<Utc>,
}

/// Flattened history line as the gateway expects it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Uploaded,
    Processing,
    Ready,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UploadedFile {
    pub name: String,
    pub size: u64,
    pub upload_date: DateTime<Utc>,
    pub status: FileStatus,
    pub upload_id: Option<String>,
}

impl UploadedFile {
    pub fn ready(name: impl Into<String>, size: u64, upload_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            upload_date: Utc::now(),
            status: FileStatus::Ready,
            upload_id: Some(upload_id.into()),
        }
    }

    /// The identifier chat turns are routed to, if the server assigned one.
    pub fn chat_id(&self) -> Option<&str> {
        self.upload_id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

/// Transient busy flags. Advisory only: they gate the command layer, not the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionFlags {
    pub is_loading: bool,
    pub is_uploading: bool,
    pub is_deleting_file: bool,
}
