//! Completion client contract tests.
//!
//! Verify the exact HTTP format the client puts on the wire and how it maps
//! responses back: request shape (model, ordered messages, sampling
//! parameters, bearer auth), success parsing, error-message extraction from
//! non-success responses, malformed bodies, and timeout expiry.

use aura::completion::{CompletionClient, OpenAiCompletionClient};
use aura::config::CompletionConfig;
use aura::conversation::Message;
use aura::credentials::{CredentialManager, CredentialRef, MemoryCredentialManager};
use aura::error::AuraError;
use std::sync::Arc;
use std::time::Duration;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> OpenAiCompletionClient {
    test_client_with(server, |_| {})
}

fn test_client_with(
    server: &MockServer,
    tweak: impl FnOnce(&mut CompletionConfig),
) -> OpenAiCompletionClient {
    let mut config = CompletionConfig {
        api_url: format!("{}/v1/chat/completions", server.uri()),
        api_key: CredentialRef::Plaintext("test-key".to_owned()),
        ..CompletionConfig::default()
    };
    tweak(&mut config);
    let credentials: Arc<dyn CredentialManager> = Arc::new(MemoryCredentialManager::new());
    OpenAiCompletionClient::new(&config, credentials).expect("failed to build client")
}

fn success_body(reply: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_234_567_890,
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": reply},
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn request_carries_model_messages_and_sampling_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "temperature": 0.7,
            "max_tokens": 150,
            "messages": [
                {"role": "system", "content": "You are a test persona."},
                {"role": "user", "content": "earlier question"},
                {"role": "assistant", "content": "earlier answer"},
                {"role": "user", "content": "new question"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body("the reply")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let history = vec![
        Message::user("earlier question"),
        Message::assistant("earlier answer"),
    ];
    let reply = client
        .complete("You are a test persona.", &history, "new question")
        .await
        .expect("request should succeed");

    assert_eq!(reply, "the reply");
}

#[tokio::test]
async fn error_message_is_extracted_from_error_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "message": "Incorrect API key provided",
                "type": "invalid_request_error"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.complete("prompt", &[], "hello").await;

    match result {
        Err(AuraError::Completion(message)) => {
            assert!(message.contains("Incorrect API key provided"));
        }
        other => panic!("expected completion error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_body_falls_back_to_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.complete("prompt", &[], "hello").await;

    match result {
        Err(AuraError::Completion(message)) => assert!(message.contains("500")),
        other => panic!("expected completion error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_success_body_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.complete("prompt", &[], "hello").await;

    match result {
        Err(AuraError::Completion(message)) => assert!(message.contains("malformed")),
        other => panic!("expected completion error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_reply_text_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body("")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.complete("prompt", &[], "hello").await;

    match result {
        Err(AuraError::Completion(message)) => assert!(message.contains("no reply")),
        other => panic!("expected completion error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_credential_is_a_precondition_error() {
    let server = MockServer::start().await;

    // No mock mounted: the request must never go out.
    let client = test_client_with(&server, |config| {
        config.api_key = CredentialRef::None;
    });
    let result = client.complete("prompt", &[], "hello").await;

    assert!(matches!(result, Err(AuraError::Precondition(_))));
}

#[tokio::test]
async fn timeout_expiry_is_a_remote_call_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(success_body("too late"))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = test_client_with(&server, |config| {
        config.request_timeout_secs = 1;
    });
    let result = client.complete("prompt", &[], "hello").await;

    match result {
        Err(AuraError::Completion(message)) => assert!(message.contains("timed out")),
        other => panic!("expected completion error, got {other:?}"),
    }
}

#[tokio::test]
async fn credential_resolves_from_the_default_keyring_slot() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer stored-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body("authorized")))
        .expect(1)
        .mount(&server)
        .await;

    let config = CompletionConfig {
        api_url: format!("{}/v1/chat/completions", server.uri()),
        api_key: CredentialRef::None,
        ..CompletionConfig::default()
    };
    let credentials = Arc::new(MemoryCredentialManager::new());
    credentials
        .store(aura::credentials::COMPLETION_API_KEY_ACCOUNT, "stored-key")
        .expect("store failed");
    let client = OpenAiCompletionClient::new(&config, credentials).expect("failed to build client");

    let reply = client.complete("prompt", &[], "hello").await.expect("request should succeed");
    assert_eq!(reply, "authorized");
}
