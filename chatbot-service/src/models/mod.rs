//! Domain models for the chatbot service.

pub mod message;
pub mod session;

pub use message::{ChatMessage, ChatRole, SessionHistory};
pub use session::SessionRecord;
