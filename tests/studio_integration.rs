use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};
use tokio::sync::RwLock;

use folio_studio::AppState;
use folio_studio::chat::ChatStore;
use folio_studio::config::{AppConfig, GenerationConfig, ProfileConfig, ServerConfig};
use folio_studio::llm::{GenRequest, GenerationSettings, Orchestrator, TextDriver, TextStream};
use folio_studio::nav::Navigator;
use folio_studio::profile::OwnerProfile;
use folio_studio::server::router;
use folio_studio::session::SessionStore;

/// Driver that replays a fixed script for every call.
struct ScriptedDriver {
    labels: String,
    chunks: Vec<String>,
}

#[async_trait::async_trait]
impl TextDriver for ScriptedDriver {
    async fn generate(&self, _req: GenRequest) -> anyhow::Result<String> {
        Ok(self.labels.clone())
    }

    async fn stream(&self, _req: GenRequest) -> anyhow::Result<TextStream> {
        let chunks = self.chunks.clone();
        Ok(Box::pin(futures::stream::iter(chunks.into_iter().map(Ok))))
    }
}

fn test_state(configured: bool) -> AppState {
    let api_key = configured.then(|| "test-key".to_string());

    let settings = GenerationSettings {
        base_url: "http://localhost".to_string(),
        api_key: api_key.clone(),
        model: "test-model".to_string(),
        temperature: 1.0,
    };

    let config = AppConfig {
        server: ServerConfig {
            port: 0,
            host: "127.0.0.1".to_string(),
        },
        generation: GenerationConfig {
            api_key,
            base_url: settings.base_url.clone(),
            model: settings.model.clone(),
            temperature: settings.temperature,
        },
        profile: ProfileConfig {
            name: "Urwan Mir".to_string(),
            handle: "urwanmir".to_string(),
            tagline: "Aspiring Web3 Security Researcher".to_string(),
        },
    };

    let profile = Arc::new(OwnerProfile::default());
    let driver = Arc::new(ScriptedDriver {
        labels: r#"["Alpha","Beta","Gamma"]"#.to_string(),
        chunks: vec!["Hel".to_string(), "lo".to_string()],
    });
    let orchestrator = Arc::new(Orchestrator::with_driver(
        settings,
        Arc::clone(&profile),
        driver,
    ));

    AppState {
        orchestrator,
        sessions: SessionStore::new(),
        chats: ChatStore::new(),
        nav: Arc::new(RwLock::new(Navigator::new())),
        profile,
        config: Arc::new(config),
    }
}

fn test_server(state: AppState) -> TestServer {
    TestServer::new(router(state)).expect("failed to build test server")
}

#[tokio::test]
async fn test_blank_prompt_is_rejected() {
    let state = test_state(true);
    let server = test_server(state.clone());

    let res = server
        .post("/api/generate")
        .json(&json!({ "prompt": "   \n " }))
        .await;
    res.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    // No session was created.
    assert!(state.sessions.is_empty());
    let sessions: Value = server.get("/api/sessions").await.json();
    assert_eq!(sessions.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_generate_creates_streaming_session() {
    let state = test_state(true);
    let server = test_server(state);

    let res = server
        .post("/api/generate")
        .json(&json!({ "prompt": "  my portfolio  " }))
        .await;
    res.assert_status_ok();
    let body: Value = res.json();
    let session_id = body["session_id"].as_str().unwrap().to_string();
    assert_eq!(
        body["stream_url"].as_str().unwrap(),
        format!("/api/generate/stream?session_id={session_id}")
    );

    let session: Value = server
        .get(&format!("/api/sessions/{session_id}"))
        .await
        .json();
    assert_eq!(session["prompt"], "my portfolio");
    let artifacts = session["artifacts"].as_array().unwrap();
    assert_eq!(artifacts.len(), 3);
    for artifact in artifacts {
        assert_eq!(artifact["status"], "streaming");
        assert_eq!(artifact["content"], "");
    }
}

#[tokio::test]
async fn test_generation_stream_completes_artifacts() {
    let state = test_state(true);
    let server = test_server(state);

    let body: Value = server
        .post("/api/generate")
        .json(&json!({ "prompt": "my portfolio" }))
        .await
        .json();
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let sse = server
        .get("/api/generate/stream")
        .add_query_param("session_id", &session_id)
        .await;
    sse.assert_status_ok();
    let text = sse.text();
    assert!(text.contains("event: stream.start"));
    assert!(text.contains("event: artifact.label"));
    assert!(text.contains("event: artifact.delta"));
    assert!(text.contains("event: artifact.done"));
    assert!(text.trim_end().ends_with("data: {\"type\":\"done\"}"));

    let session: Value = server
        .get(&format!("/api/sessions/{session_id}"))
        .await
        .json();
    let artifacts = session["artifacts"].as_array().unwrap();
    let labels: Vec<&str> = artifacts
        .iter()
        .map(|a| a["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["Alpha", "Beta", "Gamma"]);
    for artifact in artifacts {
        assert_eq!(artifact["status"], "complete");
        assert_eq!(artifact["content"], "Hello");
    }
}

#[tokio::test]
async fn test_artifact_source_endpoint() {
    let state = test_state(true);
    let server = test_server(state);

    let body: Value = server
        .post("/api/generate")
        .json(&json!({ "prompt": "my portfolio" }))
        .await
        .json();
    let session_id = body["session_id"].as_str().unwrap().to_string();

    // Drive the pipeline to completion.
    server
        .get("/api/generate/stream")
        .add_query_param("session_id", &session_id)
        .await
        .assert_status_ok();

    let source = server
        .get(&format!("/api/sessions/{session_id}/artifacts/0"))
        .await;
    source.assert_status_ok();
    assert_eq!(source.text(), "Hello");

    server
        .get(&format!("/api/sessions/{session_id}/artifacts/9"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/api/sessions/unknown/artifacts/0")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unconfigured_generation_is_disabled() {
    let state = test_state(false);
    let server = test_server(state);

    server
        .post("/api/generate")
        .json(&json!({ "prompt": "anything" }))
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);

    server
        .post("/api/chat")
        .json(&json!({ "message": "hi" }))
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);

    // The page still renders, with the setup notice.
    let page = server.get("/").await;
    page.assert_status_ok();
    assert!(page.text().contains("GEMINI_API_KEY"));
}

#[tokio::test]
async fn test_configured_page_has_no_setup_notice() {
    let state = test_state(true);
    let server = test_server(state);

    let page = server.get("/").await;
    page.assert_status_ok();
    assert!(!page.text().contains("Action Required"));
}

#[tokio::test]
async fn test_view_navigation_clamps() {
    let state = test_state(true);
    let server = test_server(state);

    // Empty: nothing to navigate.
    let view: Value = server.get("/api/view").await.json();
    assert_eq!(view["session_count"], 0);
    assert_eq!(view["current_session"], Value::Null);
    assert_eq!(view["can_go_back"], false);
    assert_eq!(view["can_go_forward"], false);

    for prompt in ["first", "second"] {
        server
            .post("/api/generate")
            .json(&json!({ "prompt": prompt }))
            .await
            .assert_status_ok();
    }

    // Submission points the view at the newest session.
    let view: Value = server.get("/api/view").await.json();
    assert_eq!(view["session_count"], 2);
    assert_eq!(view["current_session"], 1);
    assert_eq!(view["session"]["prompt"], "second");
    assert_eq!(view["can_go_back"], true);
    assert_eq!(view["can_go_forward"], false);

    // Grid mode: prev steps sessions and saturates at 0.
    let view: Value = server.post("/api/view/prev").await.json();
    assert_eq!(view["current_session"], 0);
    for _ in 0..3 {
        let view: Value = server.post("/api/view/prev").await.json();
        assert_eq!(view["current_session"], 0);
    }
    assert_eq!(view["session"]["prompt"], "first");

    // Out-of-range focus is ignored; valid focus enters focus mode.
    let view: Value = server.post("/api/view/focus/7").await.json();
    assert_eq!(view["focused_artifact"], Value::Null);
    let view: Value = server.post("/api/view/focus/1").await.json();
    assert_eq!(view["focused_artifact"], 1);

    // Focus mode: next steps artifacts and saturates at 2.
    for _ in 0..4 {
        server.post("/api/view/next").await.assert_status_ok();
    }
    let view: Value = server.get("/api/view").await.json();
    assert_eq!(view["focused_artifact"], 2);
    assert_eq!(view["current_session"], 0);
    assert_eq!(view["can_go_forward"], false);

    // Back to grid mode.
    let view: Value = server.post("/api/view/grid").await.json();
    assert_eq!(view["focused_artifact"], Value::Null);
}

#[tokio::test]
async fn test_chat_round_trip() {
    let state = test_state(true);
    let server = test_server(state.clone());

    let res = server
        .post("/api/chat")
        .json(&json!({ "message": "  hey there  " }))
        .await;
    res.assert_status_ok();
    let body: Value = res.json();
    let thread_id = body["thread_id"].as_str().unwrap().to_string();

    let sse = server
        .get("/api/chat/stream")
        .add_query_param("thread_id", &thread_id)
        .await;
    sse.assert_status_ok();
    let text = sse.text();
    assert!(text.contains("event: message.delta"));
    assert!(text.contains("Hel"));

    // The reply was appended to the thread: user message + assistant reply.
    let thread = state.chats.get(&thread_id).unwrap();
    assert_eq!(thread.message_count(), 2);
    assert_eq!(thread.messages()[0].content, "hey there");
    assert_eq!(thread.messages()[1].content, "Hello");

    // Follow-ups land in the same thread.
    let res = server
        .post("/api/chat")
        .json(&json!({ "message": "and again", "thread_id": thread_id }))
        .await;
    res.assert_status_ok();
    let body: Value = res.json();
    assert_eq!(body["thread_id"].as_str().unwrap(), thread_id);
    assert_eq!(thread.message_count(), 3);

    // Blank messages are rejected.
    server
        .post("/api/chat")
        .json(&json!({ "message": "   " }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}
