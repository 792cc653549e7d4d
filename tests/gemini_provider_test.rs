//! Gemini provider integration tests
//!
//! Runs `GeminiProvider` against a `wiremock` server standing in for the
//! generative language API.

mod common;

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stargazer::providers::{GeminiProvider, Message, TextGenerator};
use stargazer::StargazerError;

#[tokio::test]
async fn test_generate_sends_history_and_returns_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(common::GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "systemInstruction": { "parts": [{ "text": "You are an astronomer." }] },
            "contents": [
                { "role": "user", "parts": [{ "text": "What is Sirius?" }] },
                { "role": "model", "parts": [{ "text": "The brightest star in the night sky." }] },
                { "role": "user", "parts": [{ "text": "How far away is it?" }] }
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::gemini_reply("About 8.6 light-years.")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(common::gemini_config(&server.uri())).unwrap();
    let history = vec![
        Message::user("What is Sirius?"),
        Message::model("The brightest star in the night sky."),
        Message::user("How far away is it?"),
    ];

    let reply = provider
        .generate("test-key", Some("You are an astronomer."), &history)
        .await
        .expect("generate should succeed");

    assert_eq!(reply, "About 8.6 light-years.");
}

#[tokio::test]
async fn test_generate_without_system_instruction_omits_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(common::GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::gemini_reply("Vega")))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(common::gemini_config(&server.uri())).unwrap();
    provider
        .generate("k", None, &[Message::user("zenith?")])
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("systemInstruction").is_none());
}

#[tokio::test]
async fn test_invalid_key_maps_to_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(common::GENERATE_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": { "code": 403, "message": "API key not valid. Please pass a valid API key.", "status": "PERMISSION_DENIED" }
        })))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(common::gemini_config(&server.uri())).unwrap();
    let err = provider
        .generate("bad", None, &[Message::user("hi")])
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<StargazerError>(),
        Some(StargazerError::Authentication(_))
    ));
    assert!(err.to_string().contains("API key not valid"));
}

#[tokio::test]
async fn test_server_error_is_provider_error_with_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(common::GENERATE_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
            "error": { "code": 503, "message": "The model is overloaded." }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(common::gemini_config(&server.uri())).unwrap();
    let err = provider
        .generate("k", None, &[Message::user("hi")])
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("503"));
    assert!(message.contains("The model is overloaded."));
}

#[tokio::test]
async fn test_unreachable_server_is_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let provider = GeminiProvider::new(common::gemini_config(&uri)).unwrap();
    let result = provider.generate("k", None, &[Message::user("hi")]).await;

    assert!(result.is_err());
}
