//! Integration tests for the session HTTP API

use std::sync::Arc;

use base64::Engine;
use serde_json::{json, Value};
use studio_cli::config::Config;
use studio_cli::services::StudioService;
use studio_cli::transport::http::{router, AppState};

/// Start an in-process server on an ephemeral port
async fn spawn_server(config: Config) -> String {
    let service = StudioService::from_config(&config).unwrap();
    let app = router(Arc::new(AppState::new(service)));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn create_session(client: &reqwest::Client, base: &str) -> String {
    let res = client.post(format!("{}/sessions", base)).send().await.unwrap();
    assert_eq!(res.status(), 201);
    let body: Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_and_providers() {
    let base = spawn_server(Config::default()).await;
    let client = reqwest::Client::new();

    let health: Value = client
        .get(format!("{}/health", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["source"], "simulated");
    assert_eq!(health["providers"]["openai"], true);
    assert_eq!(health["providers"]["deepseek"], true);

    let providers: Value = client
        .get(format!("{}/providers", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = providers
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["OpenAI", "Anthropic", "xAI Grok", "DeepSeek"]);
    assert_eq!(providers[2]["default_model"], "grok-2-1212");
}

#[tokio::test]
async fn test_chat_round_trip_and_selection() {
    let base = spawn_server(Config::default()).await;
    let client = reqwest::Client::new();
    let id = create_session(&client, &base).await;

    let body: Value = client
        .post(format!("{}/sessions/{}/messages", base, id))
        .json(&json!({ "message": "hello" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["outcome"], "replied");
    assert_eq!(body["reply"]["provider"], "OpenAI");
    assert_eq!(body["reply"]["model"], "gpt-4o");
    assert_eq!(body["view"]["chat"].as_array().unwrap().len(), 2);

    let blank: Value = client
        .post(format!("{}/sessions/{}/messages", base, id))
        .json(&json!({ "message": "   " }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(blank["outcome"], "ignored");
    assert_eq!(blank["view"]["chat"].as_array().unwrap().len(), 2);

    // Provider change resets the model
    let view: Value = client
        .put(format!("{}/sessions/{}/provider", base, id))
        .json(&json!({ "provider": "anthropic" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let selected: Vec<&str> = view["sidebar"]["models"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|m| m["selected"] == true)
        .map(|m| m["id"].as_str().unwrap())
        .collect();
    assert_eq!(selected, vec!["claude-sonnet-4-20250514"]);

    let res = client
        .put(format!("{}/sessions/{}/model", base, id))
        .json(&json!({ "model": "gpt-4o" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let res = client
        .put(format!("{}/sessions/{}/provider", base, id))
        .json(&json!({ "provider": "mistral" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let base = spawn_server(Config::default()).await;
    let client = reqwest::Client::new();
    let a = create_session(&client, &base).await;
    let b = create_session(&client, &base).await;

    client
        .post(format!("{}/sessions/{}/messages", base, a))
        .json(&json!({ "message": "only in a" }))
        .send()
        .await
        .unwrap();
    client
        .put(format!("{}/sessions/{}/provider", base, a))
        .json(&json!({ "provider": "deepseek" }))
        .send()
        .await
        .unwrap();

    let view_b: Value = client
        .get(format!("{}/sessions/{}/view", base, b))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(view_b["chat"].as_array().unwrap().is_empty());
    assert_eq!(view_b["sidebar"]["providers"][0]["selected"], true);

    let res = client
        .delete(format!("{}/sessions/{}", base, a))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 204);
    let res = client
        .get(format!("{}/sessions/{}/view", base, a))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    let res = client
        .get(format!("{}/sessions/not-a-session/view", base))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn test_settings_toggles_and_recording() {
    let base = spawn_server(Config::default()).await;
    let client = reqwest::Client::new();
    let id = create_session(&client, &base).await;

    let res = client
        .put(format!("{}/sessions/{}/sampling", base, id))
        .json(&json!({ "temperature": 2.5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let view: Value = client
        .put(format!("{}/sessions/{}/sampling", base, id))
        .json(&json!({ "temperature": 1.5, "max_tokens": 500 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["sidebar"]["temperature"], 1.5);
    assert_eq!(view["sidebar"]["max_tokens"], 500);

    let view: Value = client
        .put(format!("{}/sessions/{}/toggles", base, id))
        .json(&json!({ "voice": true }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["voice"]["recording"], false);
    assert!(view.get("vision").is_none());

    let res = client
        .put(format!("{}/sessions/{}/voice", base, id))
        .json(&json!({ "pitch": 0.1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let view: Value = client
        .post(format!("{}/sessions/{}/recording/start", base, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["voice"]["recording"], true);
    assert_eq!(view["sidebar"]["toggles"]["recording"], true);

    let res = client
        .post(format!("{}/sessions/{}/recording/start", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 409);

    let view: Value = client
        .post(format!("{}/sessions/{}/recording/stop", base, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["voice"]["recording"], false);
}

#[tokio::test]
async fn test_compare_with_failing_provider() {
    let mut config = Config::default();
    config.simulation.fail_providers = vec!["xai".to_string()];
    let base = spawn_server(config).await;
    let client = reqwest::Client::new();
    let id = create_session(&client, &base).await;

    let health: Value = client
        .get(format!("{}/health", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["providers"]["xai"], false);
    assert_eq!(health["providers"]["anthropic"], true);

    let res = client
        .post(format!("{}/sessions/{}/compare", base, id))
        .json(&json!({ "prompt": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 204);

    let body: Value = client
        .post(format!("{}/sessions/{}/compare", base, id))
        .json(&json!({ "prompt": "Which is best?" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let tabs = body["tabs"].as_array().unwrap();
    assert_eq!(tabs.len(), 4);
    assert!(body["consensus"]
        .as_str()
        .unwrap()
        .starts_with("Consensus detected:"));
    assert!(tabs[2]["error"].is_string());
    assert!(tabs[0]["response"].as_str().unwrap().contains("OpenAI"));

    client
        .put(format!("{}/sessions/{}/toggles", base, id))
        .json(&json!({ "multi_provider": true }))
        .send()
        .await
        .unwrap();
    let view: Value = client
        .get(format!("{}/sessions/{}/view", base, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["comparison"]["prompt"], "Which is best?");
}

#[tokio::test]
async fn test_vision_upload() {
    let base = spawn_server(Config::default()).await;
    let client = reqwest::Client::new();
    let id = create_session(&client, &base).await;
    let gif = base64::engine::general_purpose::STANDARD.encode(b"GIF89a\x01\x00\x01\x00");

    let res = client
        .post(format!("{}/sessions/{}/vision", base, id))
        .json(&json!({ "image": gif }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400, "vision is off by default");

    client
        .put(format!("{}/sessions/{}/toggles", base, id))
        .json(&json!({ "vision": true }))
        .send()
        .await
        .unwrap();

    let res = client
        .post(format!("{}/sessions/{}/vision", base, id))
        .json(&json!({ "image": base64::engine::general_purpose::STANDARD.encode(b"plain text") }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let body: Value = client
        .post(format!("{}/sessions/{}/vision", base, id))
        .json(&json!({ "image": gif, "name": "dot.gif", "question": "What is it?" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["result"]["kind"], "analysis");
    assert_eq!(body["view"]["vision"]["last_upload"]["name"], "dot.gif");
    assert_eq!(body["view"]["vision"]["last_upload"]["format"], "gif");
}
