pub mod chat;

pub use chat::{AskForm, AskResponse, HistoryParams, HistoryResponse, StatusResponse, TtsForm};
