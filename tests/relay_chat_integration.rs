//! Integration tests for the `/api/chat` relay endpoint.
//!
//! Each test drives the real router with an in-memory request and a
//! wiremock upstream standing in for the OpenAI-compatible provider.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use palaver::config::ProviderConfig;
use palaver::providers::OpenAiProvider;
use palaver::relay::{router, AppState};

fn test_state(api_base: &str, api_key: Option<&str>) -> AppState {
    let config = ProviderConfig {
        api_base: api_base.to_string(),
        ..Default::default()
    };
    let provider = OpenAiProvider::with_api_key(config, api_key.map(str::to_string))
        .expect("provider should build");

    AppState {
        provider: Arc::new(provider),
    }
}

async fn post_json(app: axum::Router, uri: &str, body: String) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .expect("request should build");

    let response = app.oneshot(request).await.expect("router should respond");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let payload: Value = serde_json::from_slice(&bytes).expect("body should be JSON");

    (status, payload)
}

fn chat_completion_body(content: &str) -> Value {
    json!({
        "choices": [
            {"message": {"role": "assistant", "content": content}}
        ]
    })
}

#[tokio::test]
async fn test_chat_relays_and_wraps_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "max_tokens": 3000,
            "temperature": 0.8
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_body("Hello!")))
        .expect(1)
        .mount(&server)
        .await;

    let app = router(test_state(&server.uri(), Some("test-key")));
    let body = json!({"messages": [{"role": "user", "content": "hi"}]});
    let (status, payload) = post_json(app, "/api/chat", body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["success"], json!(true));
    assert_eq!(payload["message"], "Hello!");
}

#[tokio::test]
async fn test_chat_injects_system_instruction_first() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let app = router(test_state(&server.uri(), Some("test-key")));
    let body = json!({"messages": [{"role": "user", "content": "hi"}]});
    let (status, _payload) = post_json(app, "/api/chat", body.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let requests = server.received_requests().await.expect("requests recorded");
    let upstream: Value = serde_json::from_slice(&requests[0].body).expect("upstream body JSON");

    assert_eq!(upstream["messages"][0]["role"], "system");
    assert!(upstream["messages"][0]["content"]
        .as_str()
        .expect("system content")
        .contains("helpful assistant"));
    assert_eq!(upstream["messages"][1]["role"], "user");
    assert_eq!(upstream["messages"][1]["content"], "hi");
}

#[tokio::test]
async fn test_concise_mode_shapes_request_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "max_tokens": 1000,
            "temperature": 0.6
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_body("short")))
        .expect(1)
        .mount(&server)
        .await;

    let app = router(test_state(&server.uri(), Some("test-key")));
    let body = json!({
        "messages": [{"role": "user", "content": "hi"}],
        "responseMode": "concise"
    });
    let (status, payload) = post_json(app, "/api/chat", body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["message"], "short");
}

#[tokio::test]
async fn test_unknown_mode_falls_back_to_detailed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"max_tokens": 3000})))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let app = router(test_state(&server.uri(), Some("test-key")));
    let body = json!({
        "messages": [{"role": "user", "content": "hi"}],
        "responseMode": "grandiose"
    });
    let (status, _payload) = post_json(app, "/api/chat", body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_messages_with_images_switch_to_vision_model() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "gpt-4o"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_body("a cat")))
        .expect(1)
        .mount(&server)
        .await;

    let app = router(test_state(&server.uri(), Some("test-key")));
    let body = json!({
        "messages": [{
            "role": "user",
            "content": "what is in this picture?",
            "imageUrls": ["data:image/png;base64,AAAA"]
        }]
    });
    let (status, _payload) = post_json(app, "/api/chat", body.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    // The image message becomes a typed part list: text first, then images
    let requests = server.received_requests().await.expect("requests recorded");
    let upstream: Value = serde_json::from_slice(&requests[0].body).expect("upstream body JSON");
    let content = &upstream["messages"][1]["content"];

    assert_eq!(content[0]["type"], "text");
    assert_eq!(content[0]["text"], "what is in this picture?");
    assert_eq!(content[1]["type"], "image_url");
    assert_eq!(content[1]["image_url"]["url"], "data:image/png;base64,AAAA");
}

#[tokio::test]
async fn test_deprecated_image_url_field_is_folded() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "gpt-4o"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let app = router(test_state(&server.uri(), Some("test-key")));
    let body = json!({
        "messages": [{
            "role": "user",
            "content": "look",
            "imageUrl": "data:image/png;base64,BBBB"
        }]
    });
    let (status, _payload) = post_json(app, "/api/chat", body.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let requests = server.received_requests().await.expect("requests recorded");
    let upstream: Value = serde_json::from_slice(&requests[0].body).expect("upstream body JSON");
    let content = &upstream["messages"][1]["content"];

    assert_eq!(content[1]["image_url"]["url"], "data:image/png;base64,BBBB");
    assert!(content.get(2).is_none());
}

#[tokio::test]
async fn test_both_image_fields_rejected_without_upstream_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_body("nope")))
        .expect(0)
        .mount(&server)
        .await;

    let app = router(test_state(&server.uri(), Some("test-key")));
    let body = json!({
        "messages": [{
            "role": "user",
            "content": "look",
            "imageUrl": "a",
            "imageUrls": ["b"]
        }]
    });
    let (status, payload) = post_json(app, "/api/chat", body.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["success"], json!(false));
    assert!(payload["error"]
        .as_str()
        .expect("error string")
        .contains("both"));
}

#[tokio::test]
async fn test_malformed_json_returns_error_envelope() {
    let server = MockServer::start().await;

    let app = router(test_state(&server.uri(), Some("test-key")));
    let (status, payload) = post_json(app, "/api/chat", "{ not json".to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["success"], json!(false));
    assert!(!payload["error"].as_str().expect("error string").is_empty());
}

#[tokio::test]
async fn test_chat_missing_messages_is_client_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_body("nope")))
        .expect(0)
        .mount(&server)
        .await;

    let app = router(test_state(&server.uri(), Some("test-key")));
    let (status, payload) = post_json(app, "/api/chat", "{}".to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["success"], json!(false));
    assert!(payload["error"]
        .as_str()
        .expect("error string")
        .contains("messages"));
}

#[tokio::test]
async fn test_missing_credential_returns_configuration_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_body("nope")))
        .expect(0)
        .mount(&server)
        .await;

    let app = router(test_state(&server.uri(), None));
    let body = json!({"messages": [{"role": "user", "content": "hi"}]});
    let (status, payload) = post_json(app, "/api/chat", body.to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(payload["success"], json!(false));
    assert!(payload["error"]
        .as_str()
        .expect("error string")
        .contains("OPENAI_API_KEY"));
}

#[tokio::test]
async fn test_upstream_failure_detail_is_not_leaked() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(500).set_body_string("secret internal provider detail"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let app = router(test_state(&server.uri(), Some("test-key")));
    let body = json!({"messages": [{"role": "user", "content": "hi"}]});
    let (status, payload) = post_json(app, "/api/chat", body.to_string()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(payload["success"], json!(false));

    let error = payload["error"].as_str().expect("error string");
    assert_eq!(error, "Failed to process chat request");
    assert!(!error.contains("secret"));
}

#[tokio::test]
async fn test_empty_choices_is_an_upstream_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .expect(1)
        .mount(&server)
        .await;

    let app = router(test_state(&server.uri(), Some("test-key")));
    let body = json!({"messages": [{"role": "user", "content": "hi"}]});
    let (status, payload) = post_json(app, "/api/chat", body.to_string()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(payload["success"], json!(false));
}

#[tokio::test]
async fn test_full_history_is_forwarded_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_body("three")))
        .expect(1)
        .mount(&server)
        .await;

    let app = router(test_state(&server.uri(), Some("test-key")));
    let body = json!({
        "messages": [
            {"role": "user", "content": "one"},
            {"role": "assistant", "content": "two"},
            {"role": "user", "content": "and three?"}
        ]
    });
    let (status, _payload) = post_json(app, "/api/chat", body.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let requests = server.received_requests().await.expect("requests recorded");
    let upstream: Value = serde_json::from_slice(&requests[0].body).expect("upstream body JSON");
    let messages = upstream["messages"].as_array().expect("messages array");

    // System instruction plus the three client messages, order preserved
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[1]["content"], "one");
    assert_eq!(messages[2]["role"], "assistant");
    assert_eq!(messages[3]["content"], "and three?");
}
