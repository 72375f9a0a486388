//! Stored form of a conversation session.

use super::{ChatMessage, SessionHistory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A session document as persisted by the MongoDB session store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Opaque session key supplied by the client.
    pub session_id: String,

    /// Transcript in insertion order.
    #[serde(default)]
    pub messages: Vec<ChatMessage>,

    /// When the first message was stored.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,

    /// When the last message was stored.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl From<SessionRecord> for SessionHistory {
    fn from(record: SessionRecord) -> Self {
        SessionHistory {
            session_id: record.session_id,
            messages: record.messages,
        }
    }
}
