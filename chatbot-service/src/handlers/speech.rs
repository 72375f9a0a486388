use crate::dtos::TtsForm;
use crate::services::metrics;
use crate::startup::AppState;
use crate::utils::FormFields;
use axum::{extract::State, http::header, response::IntoResponse};
use service_core::error::AppError;
use std::time::Instant;

pub const AUDIO_MPEG: &str = "audio/mpeg";

pub async fn tts_endpoint(
    State(state): State<AppState>,
    FormFields(form): FormFields<TtsForm>,
) -> Result<impl IntoResponse, AppError> {
    let lang = form.lang.unwrap_or_else(|| state.defaults.lang.clone());
    let voice = form.voice.unwrap_or_else(|| state.defaults.voice.clone());

    let started = Instant::now();
    let result = state
        .speech_synthesizer
        .text_to_speech(&form.text, &lang, &voice)
        .await;
    metrics::record_provider_latency("synthesize", started.elapsed());

    let audio = match result {
        Ok(audio) => {
            metrics::record_tts(true, audio.len());
            audio
        }
        Err(e) => {
            metrics::record_tts(false, 0);
            metrics::record_provider_error(e.kind());
            tracing::error!(lang = %lang, voice = %voice, error = %e, "Speech synthesis failed");
            return Err(e.into());
        }
    };

    tracing::info!(
        lang = %lang,
        voice = %voice,
        text_len = form.text.len(),
        audio_bytes = audio.len(),
        "Speech synthesized"
    );

    Ok(([(header::CONTENT_TYPE, AUDIO_MPEG)], audio))
}
