mod common;

use chatbot_service::dtos::{AskResponse, HistoryResponse, StatusResponse};
use chatbot_service::models::{ChatMessage, ChatRole};
use chatbot_service::services::SessionStore;
use common::{Failures, TestApp};
use reqwest::StatusCode;

#[tokio::test]
async fn root_returns_status_message() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: StatusResponse = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body.message, "Careerist Chatbot Backend Running");
}

#[tokio::test]
async fn root_message_does_not_depend_on_state() {
    let app = TestApp::spawn().await;
    app.post_ask(&[("query", "Hello")]).await;

    let body: serde_json::Value = app
        .client
        .get(format!("{}/", app.address))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");

    assert_eq!(
        body,
        serde_json::json!({ "message": "Careerist Chatbot Backend Running" })
    );
}

#[tokio::test]
async fn history_for_unknown_session_is_empty() {
    let app = TestApp::spawn().await;

    let response = app.get_history(Some("never-seen")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body, serde_json::json!({ "chat_history": [] }));
}

#[tokio::test]
async fn ask_returns_answer_and_transcript() {
    let app = TestApp::spawn().await;

    let response = app
        .post_ask(&[("query", "How do I write a resume?"), ("session_id", "alice")])
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");

    let answer = body["answer"].as_str().expect("answer should be a string");
    assert!(!answer.is_empty());
    assert_eq!(
        body["chat_history"],
        serde_json::json!([
            { "role": "human", "content": "How do I write a resume?" },
            { "role": "ai", "content": answer }
        ])
    );
}

#[tokio::test]
async fn ask_history_matches_subsequent_history_call() {
    let app = TestApp::spawn().await;

    let ask: AskResponse = app
        .post_ask(&[("query", "Which certifications help?"), ("session_id", "bob")])
        .await
        .json()
        .await
        .expect("Failed to parse JSON");

    let history: HistoryResponse = app
        .get_history(Some("bob"))
        .await
        .json()
        .await
        .expect("Failed to parse JSON");

    assert_eq!(ask.chat_history, history.chat_history);
}

#[tokio::test]
async fn transcript_length_never_decreases() {
    let app = TestApp::spawn().await;
    let mut previous = 0;

    for question in ["First question", "Second question", "Third question"] {
        let ask: AskResponse = app
            .post_ask(&[("query", question), ("session_id", "carol")])
            .await
            .json()
            .await
            .expect("Failed to parse JSON");
        assert!(ask.chat_history.len() >= previous);

        let history: HistoryResponse = app
            .get_history(Some("carol"))
            .await
            .json()
            .await
            .expect("Failed to parse JSON");
        assert!(history.chat_history.len() >= ask.chat_history.len());
        previous = history.chat_history.len();
    }

    assert_eq!(previous, 6);
}

#[tokio::test]
async fn omitted_session_id_uses_default_session() {
    let app = TestApp::spawn().await;

    let response = app.post_ask(&[("query", "Hi there")]).await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored = app
        .store
        .get_history("default_session")
        .await
        .unwrap()
        .expect("default session should exist");
    assert_eq!(stored.messages[0], ChatMessage::human("Hi there"));

    let history: HistoryResponse = app
        .get_history(None)
        .await
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(history.chat_history, stored.messages);
}

#[tokio::test]
async fn sessions_do_not_share_history() {
    let app = TestApp::spawn().await;

    app.post_ask(&[("query", "Question for one"), ("session_id", "one")])
        .await;

    let other: HistoryResponse = app
        .get_history(Some("two"))
        .await
        .json()
        .await
        .expect("Failed to parse JSON");
    assert!(other.chat_history.is_empty());

    let one: HistoryResponse = app
        .get_history(Some("one"))
        .await
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(one.chat_history.len(), 2);
    assert_eq!(one.chat_history[1].role, ChatRole::Ai);
}

#[tokio::test]
async fn ask_without_query_is_client_error() {
    let app = TestApp::spawn().await;

    let response = app.post_ask(&[("session_id", "dave")]).await;

    assert!(
        response.status().is_client_error(),
        "expected 4xx, got {}",
        response.status()
    );
    assert!(app.store.get_history("dave").await.unwrap().is_none());
}

#[tokio::test]
async fn provider_failure_is_server_error_and_keeps_history() {
    let app = TestApp::spawn_with(Failures {
        text_provider: true,
        ..Failures::default()
    })
    .await;

    let response = app
        .post_ask(&[("query", "Will this fail?"), ("session_id", "erin")])
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "Internal server error");

    let history: HistoryResponse = app
        .get_history(Some("erin"))
        .await
        .json()
        .await
        .expect("Failed to parse JSON");
    assert!(history.chat_history.is_empty());
}

#[tokio::test]
async fn ask_accepts_multipart_form_data() {
    let app = TestApp::spawn().await;

    let response = app
        .post_multipart("/ask", &[("query", "Should I learn Rust?"), ("session_id", "grace")])
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: AskResponse = response.json().await.expect("Failed to parse JSON");
    assert_eq!(
        body.chat_history,
        vec![
            ChatMessage::human("Should I learn Rust?"),
            ChatMessage::ai(body.answer.clone()),
        ]
    );
}

#[tokio::test]
async fn multipart_ask_without_query_is_client_error() {
    let app = TestApp::spawn().await;

    let response = app.post_multipart("/ask", &[("session_id", "heidi")]).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(app.store.get_history("heidi").await.unwrap().is_none());
}
