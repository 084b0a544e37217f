//! Live provider clients against a mock HTTP server

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use studio_cli::core::{Provider, ProviderCatalog, Selection};
use studio_cli::llm::{
    AuthMethod, ChatClient, ChatRequest, ClaudeClient, ImageInput, LiveSource,
    OpenAiCompatClient, OpenAiCompatConfig, ProviderError, ResponseSource, SamplingConfig,
};
use studio_cli::vision::{ImageUpload, LiveVision, VisionAnalyzer, VisionError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request<'a>(model: &'a str, prompt: &'a str, image: Option<&'a ImageInput>) -> ChatRequest<'a> {
    ChatRequest {
        model,
        prompt,
        sampling: SamplingConfig::default(),
        image,
    }
}

fn openai_client(server: &MockServer, key: &str) -> OpenAiCompatClient {
    OpenAiCompatClient::new(OpenAiCompatConfig::new(
        "OpenAI",
        server.uri(),
        AuthMethod::BearerToken(key.to_string()),
    ))
}

#[tokio::test]
async fn test_openai_compat_sends_bearer_and_parses_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o",
            "max_tokens": 2000,
            "messages": [{ "role": "user", "content": "hello" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "Hi there" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = openai_client(&server, "sk-test");
    let text = client.complete(&request("gpt-4o", "hello", None)).await.unwrap();
    assert_eq!(text, "Hi there");
}

#[tokio::test]
async fn test_openai_compat_image_parts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": "what is this?" },
                    { "type": "image_url", "image_url": { "url": "data:image/png;base64,iVBORw0KGgo=" } }
                ]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "A tiny image" } }]
        })))
        .mount(&server)
        .await;

    let image = ImageInput {
        media_type: "image/png".to_string(),
        data: "iVBORw0KGgo=".to_string(),
    };
    let client = openai_client(&server, "k");
    let text = client
        .complete(&request("gpt-4o", "what is this?", Some(&image)))
        .await
        .unwrap();
    assert_eq!(text, "A tiny image");
}

#[tokio::test]
async fn test_openai_compat_status_mapping() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let client = openai_client(&server, "k");
    let err = client.complete(&request("gpt-4o", "hi", None)).await.unwrap_err();
    assert_eq!(err, ProviderError::RateLimited("slow down".to_string()));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_openai_compat_missing_key_never_sends() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = OpenAiCompatClient::new(OpenAiCompatConfig::new(
        "DeepSeek",
        server.uri(),
        AuthMethod::Missing {
            env_var: "DEEPSEEK_API_KEY".to_string(),
        },
    ));
    let err = client
        .complete(&request("deepseek-chat", "hi", None))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Unauthorized(msg) if msg.contains("DEEPSEEK_API_KEY")));
}

#[tokio::test]
async fn test_claude_messages_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("x-api-key", "ant-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-sonnet-4-20250514",
            "max_tokens": 2000
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                { "type": "text", "text": "Hello" },
                { "type": "tool_use", "id": "x", "name": "y", "input": {} },
                { "type": "text", "text": "world" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ClaudeClient::new(server.uri(), Some("ant-key".to_string()));
    let text = client
        .complete(&request("claude-sonnet-4-20250514", "hi", None))
        .await
        .unwrap();
    assert_eq!(text, "Hello\nworld");
}

#[tokio::test]
async fn test_claude_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid x-api-key"))
        .mount(&server)
        .await;

    let client = ClaudeClient::new(server.uri(), Some("bad".to_string()));
    let err = client
        .complete(&request("claude-sonnet-4-20250514", "hi", None))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Unauthorized(_)));
    assert!(!err.is_retryable());

    let keyless = ClaudeClient::new(server.uri(), None);
    let err = keyless
        .complete(&request("claude-sonnet-4-20250514", "hi", None))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Unauthorized(_)));
}

fn live_source(server: &MockServer, openai_key: Option<&str>) -> LiveSource {
    let openai_auth = match openai_key {
        Some(key) => AuthMethod::BearerToken(key.to_string()),
        None => AuthMethod::Missing {
            env_var: "OPENAI_API_KEY".to_string(),
        },
    };
    let missing = |name: &str, env_var: &str| {
        OpenAiCompatClient::new(OpenAiCompatConfig::new(
            name,
            server.uri(),
            AuthMethod::Missing {
                env_var: env_var.to_string(),
            },
        ))
    };
    LiveSource::new(
        OpenAiCompatClient::new(OpenAiCompatConfig::new("OpenAI", server.uri(), openai_auth)),
        ClaudeClient::new(server.uri(), Some("ant-key".to_string())),
        missing("xAI Grok", "XAI_API_KEY"),
        missing("DeepSeek", "DEEPSEEK_API_KEY"),
    )
}

#[tokio::test]
async fn test_live_source_reports_configured_keys() {
    let server = MockServer::start().await;
    let source = live_source(&server, Some("sk-test"));
    assert!(source.is_available(Provider::OpenAi));
    assert!(source.is_available(Provider::Anthropic));
    assert!(!source.is_available(Provider::XaiGrok));
    assert!(!source.is_available(Provider::DeepSeek));
}

#[tokio::test]
async fn test_live_vision_times_out_on_stalled_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "choices": [{ "message": { "content": "late" } }] }))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let vision = LiveVision::new(
        Arc::new(live_source(&server, Some("sk-test"))),
        Duration::from_millis(200),
    );
    let image = ImageUpload::from_bytes("dot.gif", b"GIF89a\x01\x00\x01\x00".to_vec()).unwrap();
    let selection = Selection::new(&ProviderCatalog::default(), Provider::OpenAi);

    let result = tokio::time::timeout(
        Duration::from_secs(3),
        vision.analyze(&image, "what is it?", &selection),
    )
    .await
    .expect("analysis should be bounded by its own timeout");
    assert!(matches!(
        result,
        Err(VisionError::Provider(ProviderError::Timeout(_)))
    ));
}
