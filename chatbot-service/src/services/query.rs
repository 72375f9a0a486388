//! Question answering over a session transcript.

use crate::models::ChatMessage;
use crate::services::metrics;
use crate::services::providers::{GenerationParams, ProviderError, TextProvider};
use crate::services::session_store::SessionStore;
use async_trait::async_trait;
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Instant;

/// Answers a query in the context of a session.
///
/// Implementations own the transcript update: a successful call leaves the
/// question and its answer appended to the session history.
#[async_trait]
pub trait QueryProcessor: Send + Sync {
    async fn process_query(&self, query: &str, session_id: &str) -> Result<String, AppError>;
}

/// Settings for [`ConversationalQueryProcessor`].
#[derive(Debug, Clone)]
pub struct ConversationSettings {
    pub system_prompt: Option<String>,
    pub max_history_messages: usize,
    pub params: GenerationParams,
}

/// Chat pipeline: recent history + query -> text provider -> transcript append.
pub struct ConversationalQueryProcessor {
    provider: Arc<dyn TextProvider>,
    store: Arc<dyn SessionStore>,
    settings: ConversationSettings,
}

impl ConversationalQueryProcessor {
    pub fn new(
        provider: Arc<dyn TextProvider>,
        store: Arc<dyn SessionStore>,
        settings: ConversationSettings,
    ) -> Self {
        Self {
            provider,
            store,
            settings,
        }
    }
}

#[async_trait]
impl QueryProcessor for ConversationalQueryProcessor {
    async fn process_query(&self, query: &str, session_id: &str) -> Result<String, AppError> {
        let history = self.store.get_history(session_id).await?.unwrap_or_default();
        let context = history.recent(self.settings.max_history_messages);

        let started = Instant::now();
        let result = self
            .provider
            .generate(
                self.settings.system_prompt.as_deref(),
                context,
                query,
                &self.settings.params,
            )
            .await;
        metrics::record_provider_latency("generate", started.elapsed());

        let response = result.map_err(|e| {
            metrics::record_provider_error(e.kind());
            tracing::error!(
                session_id = %session_id,
                model = %self.provider.model(),
                error = %e,
                "Text provider failed"
            );
            e
        })?;

        let Some(answer) = response.text.filter(|text| !text.trim().is_empty()) else {
            let err = ProviderError::EmptyResponse;
            metrics::record_provider_error(err.kind());
            tracing::error!(
                session_id = %session_id,
                model = %self.provider.model(),
                "Text provider returned no answer"
            );
            return Err(err.into());
        };

        tracing::info!(
            session_id = %session_id,
            model = %self.provider.model(),
            context_messages = context.len(),
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            finish_reason = ?response.finish_reason,
            "Query answered"
        );

        self.store
            .append_messages(
                session_id,
                vec![ChatMessage::human(query), ChatMessage::ai(answer.clone())],
            )
            .await?;

        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatRole;
    use crate::services::providers::mock::MockTextProvider;
    use crate::services::providers::{FinishReason, ProviderResponse};
    use crate::services::session_store::InMemorySessionStore;
    use std::sync::Mutex;

    /// Records the history it was given and answers with a fixed string.
    struct RecordingProvider {
        seen: Mutex<Vec<Vec<ChatMessage>>>,
        answer: Option<String>,
    }

    #[async_trait]
    impl TextProvider for RecordingProvider {
        async fn generate(
            &self,
            _system_prompt: Option<&str>,
            history: &[ChatMessage],
            _prompt: &str,
            _params: &GenerationParams,
        ) -> Result<ProviderResponse, ProviderError> {
            self.seen.lock().unwrap().push(history.to_vec());
            Ok(ProviderResponse {
                text: self.answer.clone(),
                input_tokens: 1,
                output_tokens: 1,
                finish_reason: FinishReason::Complete,
            })
        }

        fn model(&self) -> &str {
            "recording"
        }
    }

    fn settings(max_history_messages: usize) -> ConversationSettings {
        ConversationSettings {
            system_prompt: Some("You are a career coach.".to_string()),
            max_history_messages,
            params: GenerationParams::default(),
        }
    }

    #[tokio::test]
    async fn answer_and_question_are_appended() {
        let store = Arc::new(InMemorySessionStore::new());
        let processor = ConversationalQueryProcessor::new(
            Arc::new(MockTextProvider::new(true)),
            store.clone(),
            settings(20),
        );

        let answer = processor.process_query("How do I negotiate?", "s1").await.unwrap();

        let history = store.get_history("s1").await.unwrap().unwrap();
        assert_eq!(history.messages.len(), 2);
        assert_eq!(history.messages[0].role, ChatRole::Human);
        assert_eq!(history.messages[0].content, "How do I negotiate?");
        assert_eq!(history.messages[1].role, ChatRole::Ai);
        assert_eq!(history.messages[1].content, answer);
    }

    #[tokio::test]
    async fn context_is_limited_to_recent_messages() {
        let store = Arc::new(InMemorySessionStore::new());
        let provider = Arc::new(RecordingProvider {
            seen: Mutex::new(Vec::new()),
            answer: Some("ok".to_string()),
        });
        let processor = ConversationalQueryProcessor::new(provider.clone(), store, settings(3));

        for i in 0..3 {
            processor.process_query(&format!("q{}", i), "s1").await.unwrap();
        }

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen[0].len(), 0);
        assert_eq!(seen[1].len(), 2);
        assert_eq!(seen[2].len(), 3);
        // Oldest message dropped, newest kept.
        assert_eq!(seen[2][0], ChatMessage::ai("ok"));
        assert_eq!(seen[2][2], ChatMessage::ai("ok"));
        assert_eq!(seen[2][1], ChatMessage::human("q1"));
    }

    #[tokio::test]
    async fn provider_failure_leaves_history_untouched() {
        let store = Arc::new(InMemorySessionStore::new());
        let processor = ConversationalQueryProcessor::new(
            Arc::new(MockTextProvider::new(false)),
            store.clone(),
            settings(20),
        );

        let result = processor.process_query("Hello?", "s1").await;

        assert!(matches!(result, Err(AppError::InternalError(_))));
        assert!(store.get_history("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_answer_is_an_error() {
        let store = Arc::new(InMemorySessionStore::new());
        let provider = Arc::new(RecordingProvider {
            seen: Mutex::new(Vec::new()),
            answer: Some("   ".to_string()),
        });
        let processor = ConversationalQueryProcessor::new(provider, store.clone(), settings(20));

        assert!(processor.process_query("Hello?", "s1").await.is_err());
        assert!(store.get_history("s1").await.unwrap().is_none());
    }
}
