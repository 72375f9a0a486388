//! Application startup and lifecycle management.
//!
//! Wires the configured collaborators into [`AppState`], builds the router and
//! owns the listener.

use crate::config::{ChatbotConfig, FormDefaults, ProviderBackend, SessionStoreBackend};
use crate::handlers;
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::google_tts::{GoogleSpeechSynthesizer, GoogleTtsConfig};
use crate::services::providers::mock::{MockSpeechSynthesizer, MockTextProvider};
use crate::services::providers::{GenerationParams, SpeechSynthesizer, TextProvider};
use crate::services::{
    ConversationSettings, ConversationalQueryProcessor, InMemorySessionStore, MongoSessionStore,
    QueryProcessor, SessionStore,
};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    cors::permissive_with_credentials, metrics::metrics_middleware,
    tracing::{make_request_span, request_id_middleware},
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub defaults: FormDefaults,
    pub session_store: Arc<dyn SessionStore>,
    pub query_processor: Arc<dyn QueryProcessor>,
    pub speech_synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl AppState {
    /// Build the collaborators selected by `config`.
    pub async fn from_config(config: &ChatbotConfig) -> Result<Self, AppError> {
        let session_store: Arc<dyn SessionStore> = match config.session_store.backend {
            SessionStoreBackend::Memory => {
                tracing::info!("Using in-memory session store");
                Arc::new(InMemorySessionStore::new())
            }
            SessionStoreBackend::MongoDb => {
                let mongo = config.session_store.mongodb.as_ref().ok_or_else(|| {
                    AppError::ConfigError(anyhow::anyhow!(
                        "MongoDB settings are required for the mongodb session store"
                    ))
                })?;
                let store = MongoSessionStore::connect(&mongo.uri, &mongo.database).await?;
                store.initialize_indexes().await?;
                Arc::new(store)
            }
        };

        let (text_provider, speech_synthesizer): (
            Arc<dyn TextProvider>,
            Arc<dyn SpeechSynthesizer>,
        ) = match config.provider {
            ProviderBackend::Google => {
                let text: Arc<dyn TextProvider> = Arc::new(
                    GeminiTextProvider::new(GeminiConfig {
                        api_key: config.google.api_key.clone(),
                        model: config.models.text_model.clone(),
                    })
                    .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?,
                );
                let speech: Arc<dyn SpeechSynthesizer> = Arc::new(
                    GoogleSpeechSynthesizer::new(GoogleTtsConfig {
                        api_key: config.google.api_key.clone(),
                    })
                    .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?,
                );

                tracing::info!(
                    model = %config.models.text_model,
                    "Initialized Gemini text provider and Google speech synthesizer"
                );
                (text, speech)
            }
            ProviderBackend::Mock => {
                tracing::warn!("Using mock providers; answers and audio are placeholders");
                let text: Arc<dyn TextProvider> = Arc::new(MockTextProvider::new(true));
                let speech: Arc<dyn SpeechSynthesizer> = Arc::new(MockSpeechSynthesizer::new(true));
                (text, speech)
            }
        };

        let query_processor = ConversationalQueryProcessor::new(
            text_provider,
            session_store.clone(),
            ConversationSettings {
                system_prompt: Some(config.assistant.system_prompt.clone()),
                max_history_messages: config.assistant.max_history_messages,
                params: GenerationParams {
                    temperature: config.models.temperature,
                    max_tokens: config.models.max_output_tokens,
                },
            },
        );

        Ok(Self {
            defaults: config.defaults.clone(),
            session_store,
            query_processor: Arc::new(query_processor),
            speech_synthesizer,
        })
    }
}

/// Build the HTTP router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/history", get(handlers::get_history))
        .route("/ask", post(handlers::ask_question))
        .route("/tts", post(handlers::tts_endpoint))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .layer(from_fn(metrics_middleware))
        .layer(permissive_with_credentials())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: ChatbotConfig) -> Result<Self, AppError> {
        let state = AppState::from_config(&config).await?;
        Self::build_with_state(config.common.bind_addr(), state).await
    }

    /// Build the application around already-constructed collaborators.
    ///
    /// Port 0 binds a random port.
    pub async fn build_with_state(addr: SocketAddr, state: AppState) -> Result<Self, AppError> {
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Chatbot service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }

    /// Run until `shutdown` resolves, then drain in-flight requests.
    pub async fn run_with_shutdown<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
