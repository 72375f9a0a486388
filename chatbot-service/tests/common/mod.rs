#![allow(dead_code)]

use chatbot_service::config::FormDefaults;
use chatbot_service::services::providers::mock::{MockSpeechSynthesizer, MockTextProvider};
use chatbot_service::services::providers::GenerationParams;
use chatbot_service::services::{
    ConversationSettings, ConversationalQueryProcessor, InMemorySessionStore, SessionStore,
};
use chatbot_service::startup::{AppState, Application};
use std::net::SocketAddr;
use std::sync::Arc;

/// Which collaborators should fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct Failures {
    pub text_provider: bool,
    pub speech: bool,
}

pub fn test_state(failures: Failures) -> (AppState, Arc<InMemorySessionStore>) {
    test_state_with_store(failures, Arc::new(InMemorySessionStore::new()))
}

pub fn test_state_with_store<S>(failures: Failures, store: Arc<S>) -> (AppState, Arc<S>)
where
    S: SessionStore + 'static,
{
    let session_store: Arc<dyn SessionStore> = store.clone();
    let processor = ConversationalQueryProcessor::new(
        Arc::new(MockTextProvider::new(!failures.text_provider)),
        session_store.clone(),
        ConversationSettings {
            system_prompt: Some("You are a career coach.".to_string()),
            max_history_messages: 20,
            params: GenerationParams::default(),
        },
    );

    let state = AppState {
        defaults: FormDefaults::default(),
        session_store,
        query_processor: Arc::new(processor),
        speech_synthesizer: Arc::new(MockSpeechSynthesizer::new(!failures.speech)),
    };

    (state, store)
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: Arc<InMemorySessionStore>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(Failures::default()).await
    }

    pub async fn spawn_with(failures: Failures) -> Self {
        let (state, store) = test_state(failures);
        Self::spawn_with_state(state, store).await
    }

    /// Spawn around a caller-built state, e.g. with a swapped-in collaborator.
    pub async fn spawn_with_state(state: AppState, store: Arc<InMemorySessionStore>) -> Self {
        let app = Application::build_with_state(SocketAddr::from(([127, 0, 0, 1], 0)), state)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to accept connections
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
        }

        TestApp {
            address,
            port,
            store,
            client,
        }
    }

    pub async fn get_history(&self, session_id: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(format!("{}/history", self.address));
        if let Some(id) = session_id {
            request = request.query(&[("session_id", id)]);
        }
        request.send().await.expect("Failed to execute request")
    }

    pub async fn post_ask(&self, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(format!("{}/ask", self.address))
            .form(form)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_multipart(&self, path: &str, fields: &[(&str, &str)]) -> reqwest::Response {
        let form = fields
            .iter()
            .fold(reqwest::multipart::Form::new(), |form, (name, value)| {
                form.text(name.to_string(), value.to_string())
            });

        self.client
            .post(format!("{}{}", self.address, path))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_tts(&self, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(format!("{}/tts", self.address))
            .form(form)
            .send()
            .await
            .expect("Failed to execute request")
    }
}
