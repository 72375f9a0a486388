//! HTTP handlers for the chatbot service.

pub mod chat;
pub mod health;
pub mod metrics;
pub mod speech;

pub use chat::{ask_question, get_history, root};
pub use health::{health_check, readiness_check};
pub use self::metrics::metrics_endpoint;
pub use speech::tts_endpoint;
