//! Integration tests for the LLM provider HTTP clients against a mock server.

mod common;

use std::time::Duration;

use commit_assist::config::{ProviderConfig, ProviderSettings};
use commit_assist::error::ProviderError;
use commit_assist::llm::{
    AnthropicClient, LlmError, LlmRouter, OpenAiCompatClient, Provider, TextProvider,
};
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn key(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

fn chat_reply(content: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

fn anthropic_reply(text: &str) -> Value {
    json!({
        "id": "msg_1",
        "type": "message",
        "role": "assistant",
        "content": [{ "type": "text", "text": text }],
        "stop_reason": "end_turn"
    })
}

fn provider_config(provider: Provider, base_url: &str) -> ProviderConfig {
    ProviderConfig {
        provider,
        api_key: key("test-key"),
        model: "test-model".to_string(),
        base_url: base_url.to_string(),
    }
}

// =============================================================================
// OPENAI-COMPATIBLE CLIENT
// =============================================================================

#[tokio::test]
async fn test_groq_request_shape_and_auth() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer gsk-test"))
        .and(body_partial_json(json!({
            "model": "llama-3.3-70b-versatile",
            "max_tokens": 200,
            "messages": [
                { "role": "system", "content": "system text" },
                { "role": "user", "content": "prompt text" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("feat: add login")))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiCompatClient::new(
        Provider::Groq,
        key("gsk-test"),
        "llama-3.3-70b-versatile",
        &server.uri(),
    );
    let output = client.generate("system text", "prompt text").await.unwrap();

    assert_eq!(output, "feat: add login");
    assert_eq!(client.provider(), Provider::Groq);
}

#[tokio::test]
async fn test_openai_sends_temperature() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("fix: typo")))
        .mount(&server)
        .await;

    let client = OpenAiCompatClient::new(Provider::OpenAi, key("sk"), "gpt-4o-mini", &server.uri());
    client.generate("s", "p").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let temperature = body["temperature"].as_f64().unwrap();
    assert!((temperature - 0.7).abs() < 1e-6);
    assert_eq!(body["model"], "gpt-4o-mini");
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let client = OpenAiCompatClient::new(Provider::OpenAi, key("bad"), "gpt-4o-mini", &server.uri());
    let err = client.generate("s", "p").await.unwrap_err();

    match err {
        ProviderError::Api { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid api key");
        }
        other => panic!("Expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_choices_is_empty_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let client = OpenAiCompatClient::new(Provider::Groq, key("gsk"), "m", &server.uri());
    let err = client.generate("s", "p").await.unwrap_err();
    assert!(matches!(err, ProviderError::EmptyResponse));
}

#[tokio::test]
async fn test_non_json_body_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let client = OpenAiCompatClient::new(Provider::Groq, key("gsk"), "m", &server.uri());
    let err = client.generate("s", "p").await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidResponse(_)));
}

// =============================================================================
// ANTHROPIC CLIENT
// =============================================================================

#[tokio::test]
async fn test_anthropic_request_shape_and_headers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-ant-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-3-5-sonnet-20241022",
            "max_tokens": 200,
            "messages": [
                { "role": "user", "content": "system text\n\nprompt text" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(anthropic_reply("docs: explain setup")))
        .expect(1)
        .mount(&server)
        .await;

    let client = AnthropicClient::new(key("sk-ant-test"), "claude-3-5-sonnet-20241022", &server.uri());
    let output = client.generate("system text", "prompt text").await.unwrap();

    assert_eq!(output, "docs: explain setup");
}

#[tokio::test]
async fn test_anthropic_without_text_block() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "content": [] })))
        .mount(&server)
        .await;

    let client = AnthropicClient::new(key("sk-ant"), "m", &server.uri());
    let err = client.generate("s", "p").await.unwrap_err();
    assert!(matches!(err, ProviderError::EmptyResponse));
}

// =============================================================================
// FAILOVER OVER HTTP
// =============================================================================

#[tokio::test]
async fn test_router_falls_through_failed_provider() {
    let groq = MockServer::start().await;
    let openai = MockServer::start().await;
    let anthropic = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .expect(1)
        .mount(&groq)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("  refactor: split module \n")))
        .expect(1)
        .mount(&openai)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(anthropic_reply("unused")))
        .expect(0)
        .mount(&anthropic)
        .await;

    let settings = ProviderSettings {
        providers: vec![
            provider_config(Provider::Groq, &groq.uri()),
            provider_config(Provider::OpenAi, &openai.uri()),
            provider_config(Provider::Anthropic, &anthropic.uri()),
        ],
        timeout: Duration::from_secs(10),
    };

    let completion = LlmRouter::from_settings(&settings)
        .generate("s", "p")
        .await
        .unwrap();

    assert_eq!(completion.output, "refactor: split module");
    assert_eq!(completion.provider, Provider::OpenAi);
    assert_eq!(completion.skipped.len(), 1);
}

#[tokio::test]
async fn test_router_reports_exhaustion() {
    let groq = MockServer::start().await;
    let anthropic = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("   ")))
        .mount(&groq)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
        .mount(&anthropic)
        .await;

    let settings = ProviderSettings {
        providers: vec![
            provider_config(Provider::Groq, &groq.uri()),
            provider_config(Provider::Anthropic, &anthropic.uri()),
        ],
        timeout: Duration::from_secs(10),
    };

    let err = LlmRouter::from_settings(&settings)
        .generate("s", "p")
        .await
        .unwrap_err();

    assert!(matches!(err, LlmError::AllProvidersFailed { .. }));
    assert_eq!(err.failures().len(), 2);
    assert!(err.summary().contains("ANTHROPIC_API_KEY in .env"));
    assert!(err.detailed().contains("Anthropic: API returned status 529"));
}

#[tokio::test]
async fn test_slow_provider_hits_timeout() {
    let groq = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_reply("late"))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&groq)
        .await;

    let settings = ProviderSettings {
        providers: vec![provider_config(Provider::Groq, &groq.uri())],
        timeout: Duration::from_secs(1),
    };

    let err = LlmRouter::from_settings(&settings)
        .generate("s", "p")
        .await
        .unwrap_err();

    assert!(matches!(
        err.failures()[0].error,
        ProviderError::Timeout(1)
    ));
}
