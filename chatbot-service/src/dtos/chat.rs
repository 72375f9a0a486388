use crate::models::{ChatMessage, SessionHistory};
use serde::{Deserialize, Serialize};

/// Query string of `GET /history`.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub session_id: Option<String>,
}

/// Form body of `POST /ask`.
#[derive(Debug, Deserialize)]
pub struct AskForm {
    pub query: String,
    pub session_id: Option<String>,
}

/// Form body of `POST /tts`.
#[derive(Debug, Deserialize)]
pub struct TtsForm {
    pub text: String,
    pub lang: Option<String>,
    pub voice: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub chat_history: Vec<ChatMessage>,
}

impl From<Option<SessionHistory>> for HistoryResponse {
    fn from(history: Option<SessionHistory>) -> Self {
        Self {
            chat_history: history.map(|h| h.messages).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub chat_history: Vec<ChatMessage>,
}
