//! Metrics collection and Prometheus export.
//!
//! HTTP request metrics come from `service_core::middleware::metrics`; this module
//! adds the chatbot-specific series and renders everything for `/metrics`.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use service_core::error::AppError;
use std::sync::OnceLock;
use std::time::Duration;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Call once at startup.
pub fn init_metrics() -> Result<(), AppError> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        AppError::InternalError(anyhow::anyhow!(
            "failed to install Prometheus recorder: {}",
            e
        ))
    })?;

    METRICS_HANDLE
        .set(handle)
        .map_err(|_| AppError::InternalError(anyhow::anyhow!("metrics already initialized")))
}

/// Get the current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

fn status_label(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "error"
    }
}

pub fn record_query(success: bool) {
    counter!("chatbot_queries_total", "status" => status_label(success)).increment(1);
}

pub fn record_tts(success: bool, audio_bytes: usize) {
    counter!("chatbot_tts_requests_total", "status" => status_label(success)).increment(1);
    if success {
        histogram!("chatbot_tts_audio_bytes").record(audio_bytes as f64);
    }
}

pub fn record_provider_error(kind: &'static str) {
    counter!("chatbot_provider_errors_total", "kind" => kind).increment(1);
}

pub fn record_provider_latency(operation: &'static str, elapsed: Duration) {
    histogram!("chatbot_provider_latency_seconds", "operation" => operation)
        .record(elapsed.as_secs_f64());
}
