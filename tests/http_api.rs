//! End-to-end tests for the HTTP surface
//!
//! Each test boots the real axum server on an ephemeral port with a
//! tempdir-backed data directory, and points the provider at a `wiremock`
//! stand-in for the upstream completion API.

use std::sync::Arc;

use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use palaver::config::ProviderConfig;
use palaver::providers::OpenAiProvider;
use palaver::server::{router, AppState};
use palaver::session::{Message, Session};
use palaver::storage::{ChatArchive, MemoryStore};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct TestApp {
    base_url: String,
    memory: MemoryStore,
    // Keeps the data directory alive for the duration of the test.
    _data_dir: tempfile::TempDir,
}

/// Boots the server against the given upstream, returning its base URL.
async fn spawn_app(upstream_url: &str, memory_enabled: bool) -> TestApp {
    let data_dir = tempfile::tempdir().expect("create temp data dir");

    let provider = OpenAiProvider::new(&ProviderConfig {
        api_base: upstream_url.to_string(),
        model: "test-model".to_string(),
        api_key_env: "PALAVER_TEST_NO_SUCH_KEY".to_string(),
        request_timeout_seconds: 5,
    })
    .expect("create provider");

    let memory = MemoryStore::new(data_dir.path().join("memory.json"));
    let state = AppState::with_provider(
        Arc::new(provider),
        ChatArchive::new(data_dir.path().join("saved_chats")),
        memory.clone(),
        memory_enabled,
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.expect("serve");
    });

    TestApp {
        base_url: format!("http://{}", addr),
        memory,
        _data_dir: data_dir,
    }
}

/// Mounts a canned completion reply on the mock upstream.
async fn mount_reply(server: &MockServer, reply: &str) {
    let body = serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": reply } }]
    });
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn sample_session() -> Session {
    let mut session = Session::new(1_700_000_000_000, "Saved conversation");
    session.messages.push(Message::user("hello", None));
    session.messages.push(Message::assistant("hi there"));
    session
}

// ---------------------------------------------------------------------------
// POST /api/chat
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_chat_with_json_history_returns_reply() {
    let upstream = MockServer::start().await;
    mount_reply(&upstream, "Hello back").await;
    let app = spawn_app(&upstream.uri(), false).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/chat", app.base_url))
        .json(&serde_json::json!({
            "messages": [{ "role": "user", "content": "Hello" }]
        }))
        .send()
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("json body");
    assert_eq!(body["reply"], "Hello back");
}

#[tokio::test]
async fn test_chat_multipart_forwards_file_text_upstream() {
    let upstream = MockServer::start().await;
    let body = serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": "I read it" } }]
    });
    // The text file's contents must appear in the upstream request.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("the attached notes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&upstream)
        .await;

    let app = spawn_app(&upstream.uri(), false).await;

    let form = reqwest::multipart::Form::new()
        .text("message", "Please summarize this file")
        .part(
            "file",
            reqwest::multipart::Part::bytes("the attached notes".as_bytes().to_vec())
                .file_name("notes.txt")
                .mime_str("text/plain")
                .expect("valid mime"),
        );

    let response = reqwest::Client::new()
        .post(format!("{}/api/chat", app.base_url))
        .multipart(form)
        .send()
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("json body");
    assert_eq!(body["reply"], "I read it");

    upstream.verify().await;
}

#[tokio::test]
async fn test_chat_upstream_failure_maps_to_500() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&upstream)
        .await;

    let app = spawn_app(&upstream.uri(), false).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/chat", app.base_url))
        .json(&serde_json::json!({
            "messages": [{ "role": "user", "content": "Hello" }]
        }))
        .send()
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), 500);
    let body: serde_json::Value = response.json().await.expect("json body");
    assert_eq!(body["error"], "Failed to fetch AI response");
}

#[tokio::test]
async fn test_chat_records_memory_when_enabled() {
    let upstream = MockServer::start().await;
    mount_reply(&upstream, "A fine question.").await;
    let app = spawn_app(&upstream.uri(), true).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/chat", app.base_url))
        .json(&serde_json::json!({
            "messages": [{ "role": "user", "content": "What is Rust?" }]
        }))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(response.status(), 200);

    let records = app.memory.load().expect("load memory");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].topic, "What is Rust?");
    assert_eq!(records[0].summary, "A fine question.");

    // One completion for the chat, one for the summary.
    assert_eq!(upstream.received_requests().await.unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Archive endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_save_then_load_round_trips() {
    let upstream = MockServer::start().await;
    let app = spawn_app(&upstream.uri(), false).await;
    let session = sample_session();

    let save = reqwest::Client::new()
        .post(format!("{}/api/save-chat", app.base_url))
        .json(&serde_json::json!({ "chat": session }))
        .send()
        .await
        .expect("save should succeed");
    assert_eq!(save.status(), 200);
    let body: serde_json::Value = save.json().await.expect("json body");
    assert_eq!(body["message"], "Chat saved successfully");

    let load = reqwest::Client::new()
        .get(format!(
            "{}/api/load-chat?id={}",
            app.base_url, session.id
        ))
        .send()
        .await
        .expect("load should succeed");
    assert_eq!(load.status(), 200);
    let loaded: Session = load.json().await.expect("session body");
    assert_eq!(loaded, session);
}

#[tokio::test]
async fn test_load_unknown_id_is_404() {
    let upstream = MockServer::start().await;
    let app = spawn_app(&upstream.uri(), false).await;

    let response = reqwest::Client::new()
        .get(format!("{}/api/load-chat?id=123456", app.base_url))
        .send()
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), 404);
    let body: serde_json::Value = response.json().await.expect("json body");
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_list_empty_archive_is_empty_array() {
    let upstream = MockServer::start().await;
    let app = spawn_app(&upstream.uri(), false).await;

    let response = reqwest::Client::new()
        .get(format!("{}/api/list-chats", app.base_url))
        .send()
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("json body");
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn test_list_shows_saved_sessions_with_derived_date() {
    let upstream = MockServer::start().await;
    let app = spawn_app(&upstream.uri(), false).await;
    let session = sample_session();

    reqwest::Client::new()
        .post(format!("{}/api/save-chat", app.base_url))
        .json(&serde_json::json!({ "chat": session }))
        .send()
        .await
        .expect("save should succeed");

    let response = reqwest::Client::new()
        .get(format!("{}/api/list-chats", app.base_url))
        .send()
        .await
        .expect("request should succeed");

    let listing: serde_json::Value = response.json().await.expect("json body");
    assert_eq!(listing.as_array().unwrap().len(), 1);
    assert_eq!(listing[0]["id"], session.id);
    assert_eq!(listing[0]["title"], "Saved conversation");
    // 1_700_000_000_000 ms is 2023-11-14T22:13:20Z.
    assert!(listing[0]["date"].as_str().unwrap().starts_with("2023-11-14"));
}
