use crate::dtos::{AskForm, AskResponse, HistoryParams, HistoryResponse, StatusResponse};
use crate::services::metrics;
use crate::startup::AppState;
use crate::utils::FormFields;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

pub const STATUS_MESSAGE: &str = "Careerist Chatbot Backend Running";

pub async fn root() -> impl IntoResponse {
    Json(StatusResponse {
        message: STATUS_MESSAGE.to_string(),
    })
}

pub async fn get_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<impl IntoResponse, AppError> {
    let session_id = params
        .session_id
        .unwrap_or_else(|| state.defaults.session_id.clone());

    let history = state.session_store.get_history(&session_id).await?;

    Ok(Json(HistoryResponse::from(history)))
}

pub async fn ask_question(
    State(state): State<AppState>,
    FormFields(form): FormFields<AskForm>,
) -> Result<impl IntoResponse, AppError> {
    let session_id = form
        .session_id
        .unwrap_or_else(|| state.defaults.session_id.clone());

    tracing::info!(
        session_id = %session_id,
        query_len = form.query.len(),
        "Processing query"
    );

    let result = state
        .query_processor
        .process_query(&form.query, &session_id)
        .await;
    metrics::record_query(result.is_ok());
    let answer = result?;

    // Re-read so the returned transcript matches what GET /history serves.
    let history = state.session_store.get_history(&session_id).await?;

    Ok(Json(AskResponse {
        answer,
        chat_history: HistoryResponse::from(history).chat_history,
    }))
}
