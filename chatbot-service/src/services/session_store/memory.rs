use super::SessionStore;
use crate::models::{ChatMessage, SessionHistory};
use async_trait::async_trait;
use dashmap::DashMap;
use service_core::error::AppError;

/// Process-local session store. Transcripts live as long as the process.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, SessionHistory>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_history(&self, session_id: &str) -> Result<Option<SessionHistory>, AppError> {
        Ok(self
            .sessions
            .get(session_id)
            .map(|entry| entry.value().clone()))
    }

    async fn append_messages(
        &self,
        session_id: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<(), AppError> {
        // The entry guard holds the shard lock, so one call's messages stay together.
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionHistory::new(session_id))
            .messages
            .extend(messages);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
