//! Conversation history storage.
//!
//! The router only reads transcripts; the query processor appends to them.

pub mod memory;
pub mod mongo;

pub use memory::InMemorySessionStore;
pub use mongo::MongoSessionStore;

use crate::models::{ChatMessage, SessionHistory};
use async_trait::async_trait;
use service_core::error::AppError;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Transcript for `session_id`, or `None` if nothing was ever stored for it.
    async fn get_history(&self, session_id: &str) -> Result<Option<SessionHistory>, AppError>;

    /// Append `messages` in order, creating the session if needed.
    ///
    /// All messages of one call land contiguously in the transcript.
    async fn append_messages(
        &self,
        session_id: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<(), AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}
