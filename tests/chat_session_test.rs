//! Chat session integration tests
//!
//! Exercises `ChatSession` end to end with the Gemini provider pointed at a
//! `wiremock` server.

mod common;

use std::sync::Arc;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stargazer::calculator::CalculatorQuery;
use stargazer::config::ChatConfig;
use stargazer::credential::MemoryCredentialStore;
use stargazer::providers::{GeminiProvider, Role};
use stargazer::{ChatSession, SubmitOutcome};

fn session_for(server: &MockServer) -> ChatSession {
    let provider = GeminiProvider::new(common::gemini_config(&server.uri())).unwrap();
    ChatSession::new(
        &ChatConfig::default(),
        Arc::new(provider),
        Arc::new(MemoryCredentialStore::with_value("test-key")),
    )
}

#[tokio::test]
async fn test_successful_turn_appends_user_and_model() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(common::GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::gemini_reply("Jupiter and Saturn are well placed.")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let before = session.store().messages().len();

    let outcome = session.send("What planets are visible tonight?").await;

    assert_eq!(
        outcome,
        SubmitOutcome::Replied("Jupiter and Saturn are well placed.".to_string())
    );
    let messages = session.store().messages();
    assert_eq!(messages.len(), before + 2);
    assert_eq!(messages[before].role, Role::User);
    assert_eq!(messages[before + 1].role, Role::Model);
}

#[tokio::test]
async fn test_failed_turn_keeps_user_message_and_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(common::GENERATE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let before = session.store().messages().len();

    let outcome = session.send("What is a nebula?").await;

    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    assert_eq!(session.store().messages().len(), before + 1);
    assert!(session.store().error().unwrap().contains("500"));
    assert!(!session.store().in_flight());
}

#[tokio::test]
async fn test_blank_input_issues_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::gemini_reply("x")))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    assert_eq!(session.send(" \t ").await, SubmitOutcome::Ignored);
    assert_eq!(session.store().messages().len(), 1);
}

#[tokio::test]
async fn test_calculator_incomplete_issues_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::gemini_reply("x")))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let result = session
        .calculate(&CalculatorQuery::new("51.5", "-0.1", ""))
        .await;

    assert_eq!(result, stargazer::calculator::INCOMPLETE_FIELDS_MESSAGE);
}

#[tokio::test]
async fn test_calculator_sends_single_turn_prompt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(common::GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::gemini_reply("Hercules is overhead.")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session_for(&server);
    let result = session
        .calculate(&CalculatorQuery::new("40.7", "-74.0", "2024-07-04 22:00"))
        .await;

    assert_eq!(result, "Hercules is overhead.");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let contents = body["contents"].as_array().unwrap();
    assert_eq!(contents.len(), 1);
    assert!(contents[0]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .contains("latitude 40.7"));
}
