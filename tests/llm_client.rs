// file: tests/llm_client.rs
// description: http contract tests for the chat completions client

use note_search::{Config, GroqChatClient, LanguageModel, LlmConfig, RetryPolicy, SearchError};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn llm_config(server: &MockServer) -> LlmConfig {
    let mut config = Config::default_config().llm;
    config.api_base = format!("{}/openai/v1/", server.uri());
    config.api_key = Some("gsk-test".to_string());
    config.model = "test-model".to_string();
    config.timeout_secs = 5;
    config
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn returns_first_choice_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(header("Authorization", "Bearer gsk-test"))
        .and(body_partial_json(json!({"model": "test-model"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("{\"relevant\": []}")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GroqChatClient::new(&llm_config(&server)).unwrap();
    assert!(client.endpoint().ends_with("/openai/v1/chat/completions"));

    let content = client.complete("find my notes").await.unwrap();
    assert_eq!(content, "{\"relevant\": []}");
}

#[tokio::test]
async fn server_error_is_transient_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("over capacity"))
        .mount(&server)
        .await;

    let client = GroqChatClient::new(&llm_config(&server)).unwrap();
    let err = client.complete("q").await.unwrap_err();

    match &err {
        SearchError::ModelStatus { status, body } => {
            assert_eq!(*status, 503);
            assert_eq!(body, "over capacity");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_transient());
}

#[tokio::test]
async fn client_error_is_not_transient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let client = GroqChatClient::new(&llm_config(&server)).unwrap();
    let err = client.complete("q").await.unwrap_err();

    assert!(matches!(err, SearchError::ModelStatus { status: 401, .. }));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn malformed_body_is_response_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let client = GroqChatClient::new(&llm_config(&server)).unwrap();
    let err = client.complete("q").await.unwrap_err();

    assert!(matches!(err, SearchError::ModelResponse(_)));
}

#[tokio::test]
async fn slow_server_reports_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("{}"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut config = llm_config(&server);
    config.timeout_secs = 1;
    let client = GroqChatClient::new(&config).unwrap();
    let err = client.complete("q").await.unwrap_err();

    assert!(err.is_timeout());
    assert!(err.is_transient());
}

#[tokio::test]
async fn retry_policy_recovers_from_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GroqChatClient::new(&llm_config(&server)).unwrap();
    let policy = RetryPolicy::new(2, Duration::from_millis(5));

    let attempted = policy.run(|| client.complete("q")).await;
    assert_eq!(attempted.attempts, 2);
    assert_eq!(attempted.result.unwrap(), "ok");
}
