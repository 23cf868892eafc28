//! HTTP server: router, API handlers, and SSE streaming.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::events::{StudioEvent, sse_event};
use crate::nav::ViewFlags;
use crate::session::{ArtifactStatus, Session};
use crate::ui;

/// Start the Axum server with the provided state.
pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = format!(
        "{}:{}",
        state.config.server.host, state.config.server.port
    );

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %format!("http://{addr}"),
        "Server started"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        // API routes
        .route("/api/generate", post(api_generate))
        .route("/api/generate/stream", get(api_generate_stream))
        .route("/api/sessions", get(api_list_sessions))
        .route("/api/sessions/{id}", get(api_get_session))
        .route(
            "/api/sessions/{id}/artifacts/{index}",
            get(api_get_artifact_source),
        )
        .route("/api/view", get(api_get_view))
        .route("/api/view/next", post(api_view_next))
        .route("/api/view/prev", post(api_view_prev))
        .route("/api/view/focus/{index}", post(api_view_focus))
        .route("/api/view/grid", post(api_view_grid))
        .route("/api/chat", post(api_chat))
        .route("/api/chat/stream", get(api_chat_stream))
        // HTML pages
        .route("/", get(index_handler))
        .route("/profile", get(profile_handler))
        // Static assets
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Page Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Studio page handler.
async fn index_handler(State(state): State<AppState>) -> impl IntoResponse {
    let configured = state.orchestrator.is_configured();
    Html(ui::html_shell(
        "Studio",
        &ui::studio_content(&state.profile, configured),
        &state.profile,
    ))
}

/// Profile page handler.
async fn profile_handler(State(state): State<AppState>) -> impl IntoResponse {
    Html(ui::html_shell(
        "Profile",
        &ui::profile_content(&state.profile),
        &state.profile,
    ))
}

// ─────────────────────────────────────────────────────────────────────────────
// DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Artifact DTO for API responses.
#[derive(Debug, Serialize)]
struct ArtifactDto {
    id: String,
    label: String,
    content: String,
    status: ArtifactStatus,
}

/// Session DTO for API responses.
#[derive(Debug, Serialize)]
struct SessionDto {
    id: String,
    prompt: String,
    created_at: DateTime<Utc>,
    artifacts: Vec<ArtifactDto>,
}

/// Session summary for listings.
#[derive(Debug, Serialize)]
struct SessionSummary {
    id: String,
    prompt: String,
    created_at: DateTime<Utc>,
}

fn session_dto(session: &Session) -> SessionDto {
    SessionDto {
        id: session.id.clone(),
        prompt: session.prompt.clone(),
        created_at: session.created_at,
        artifacts: session
            .artifacts
            .iter()
            .map(|a| ArtifactDto {
                id: a.id.clone(),
                label: a.label.clone(),
                content: a.content.clone(),
                status: a.status,
            })
            .collect(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Generation API
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for the generate API.
#[derive(Debug, Deserialize)]
struct GenerateRequest {
    /// The visitor's prompt.
    prompt: String,
}

/// Response from the generate API.
#[derive(Debug, Serialize)]
struct GenerateResponse {
    /// Newly created session.
    session_id: String,
    /// URL for the SSE stream that drives generation.
    stream_url: String,
}

/// POST /api/generate - Create a session and get its stream URL.
async fn api_generate(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, (StatusCode, String)> {
    if !state.orchestrator.is_configured() {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "Generation is disabled: no API key configured".to_string(),
        ));
    }

    let Some(session) = state.sessions.create(&req.prompt) else {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Prompt must not be empty".to_string(),
        ));
    };

    state
        .nav
        .write()
        .await
        .on_session_created(state.sessions.len());

    let stream_url = format!("/api/generate/stream?session_id={}", session.id);

    info!(
        session_id = %session.id,
        prompt = %session.prompt,
        stream_url = %stream_url,
        "Generation session created"
    );

    Ok(Json(GenerateResponse {
        session_id: session.id,
        stream_url,
    }))
}

/// Query parameters for the generation stream endpoint.
#[derive(Debug, Deserialize)]
struct GenerateStreamQuery {
    /// Session ID returned by POST /api/generate.
    session_id: String,
}

/// GET /api/generate/stream - SSE stream driving the generation pipeline.
async fn api_generate_stream(
    State(state): State<AppState>,
    Query(query): Query<GenerateStreamQuery>,
) -> Response {
    if !state.orchestrator.is_configured() {
        return single_error_sse("Generation is disabled: no API key configured");
    }

    let Some(session) = state.sessions.get(&query.session_id) else {
        tracing::error!(session_id = %query.session_id, "Session not found");
        return single_error_sse("Session not found");
    };

    info!(
        session_id = %query.session_id,
        "Starting generation SSE stream"
    );

    let orchestrator = std::sync::Arc::clone(&state.orchestrator);
    let store = state.sessions.clone();

    let sse_stream = async_stream::stream! {
        let events = orchestrator.generate_session(store, session);
        futures::pin_mut!(events);
        while let Some(event) = events.next().await {
            yield Ok::<String, std::convert::Infallible>(sse_event(&event));
        }
    };

    let body = axum::body::Body::from_stream(sse_stream);
    build_sse_response(body)
}

// ─────────────────────────────────────────────────────────────────────────────
// Session API
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/sessions - List all sessions, oldest first.
async fn api_list_sessions(State(state): State<AppState>) -> Json<Vec<SessionSummary>> {
    let sessions = state
        .sessions
        .sessions()
        .iter()
        .map(|s| SessionSummary {
            id: s.id.clone(),
            prompt: s.prompt.clone(),
            created_at: s.created_at,
        })
        .collect();
    Json(sessions)
}

/// GET /api/sessions/:id - Get one session with artifact contents.
async fn api_get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionDto>, StatusCode> {
    match state.sessions.get(&id) {
        Some(session) => Ok(Json(session_dto(&session))),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// GET /api/sessions/:id/artifacts/:index - Raw source of one artifact.
async fn api_get_artifact_source(
    State(state): State<AppState>,
    Path((id, index)): Path<(String, usize)>,
) -> Result<String, StatusCode> {
    let session = state.sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let artifact = session.artifacts.get(index).ok_or(StatusCode::NOT_FOUND)?;
    Ok(artifact.content.clone())
}

// ─────────────────────────────────────────────────────────────────────────────
// View API
// ─────────────────────────────────────────────────────────────────────────────

/// Navigation snapshot returned by the view endpoints.
#[derive(Debug, Serialize)]
struct ViewSnapshot {
    session_count: usize,
    #[serde(flatten)]
    flags: ViewFlags,
    session: Option<SessionDto>,
}

async fn view_snapshot(state: &AppState) -> ViewSnapshot {
    let nav = *state.nav.read().await;
    let session_count = state.sessions.len();
    let session = nav
        .current_session
        .and_then(|i| state.sessions.get_index(i))
        .map(|s| session_dto(&s));

    ViewSnapshot {
        session_count,
        flags: nav.flags(session_count),
        session,
    }
}

/// GET /api/view - Current navigation state and session on stage.
async fn api_get_view(State(state): State<AppState>) -> Json<ViewSnapshot> {
    Json(view_snapshot(&state).await)
}

/// POST /api/view/next - Step forward (artifact in focus mode, session in
/// grid mode).
async fn api_view_next(State(state): State<AppState>) -> Json<ViewSnapshot> {
    let count = state.sessions.len();
    state.nav.write().await.next(count);
    Json(view_snapshot(&state).await)
}

/// POST /api/view/prev - Step backward.
async fn api_view_prev(State(state): State<AppState>) -> Json<ViewSnapshot> {
    state.nav.write().await.prev();
    Json(view_snapshot(&state).await)
}

/// POST /api/view/focus/:index - Enter focus mode on one artifact.
async fn api_view_focus(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Json<ViewSnapshot> {
    state.nav.write().await.focus(index);
    Json(view_snapshot(&state).await)
}

/// POST /api/view/grid - Back to grid mode.
async fn api_view_grid(State(state): State<AppState>) -> Json<ViewSnapshot> {
    state.nav.write().await.unfocus();
    Json(view_snapshot(&state).await)
}

// ─────────────────────────────────────────────────────────────────────────────
// Persona Chat API
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for the chat API.
#[derive(Debug, Deserialize)]
struct ChatRequest {
    /// Visitor message content.
    message: String,
    /// Optional thread ID (creates a new thread if not provided).
    #[serde(default)]
    thread_id: Option<String>,
}

/// Response from the chat API.
#[derive(Debug, Serialize)]
struct ChatResponse {
    /// Thread ID for this conversation.
    thread_id: String,
    /// URL for the SSE stream.
    stream_url: String,
}

/// POST /api/chat - Record a visitor message and get the reply stream URL.
async fn api_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    if !state.orchestrator.is_configured() {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "Chat is disabled: no API key configured".to_string(),
        ));
    }

    let message = req.message.trim();
    if message.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Message must not be empty".to_string(),
        ));
    }

    let thread = state.chats.get_or_create(req.thread_id.as_deref());
    thread.add_user_message(message);

    let thread_id = thread.id().to_string();
    let stream_url = format!("/api/chat/stream?thread_id={thread_id}");

    info!(
        thread_id = %thread_id,
        message_count = thread.message_count(),
        "Chat message recorded"
    );

    Ok(Json(ChatResponse {
        thread_id,
        stream_url,
    }))
}

/// Query parameters for the chat stream endpoint.
#[derive(Debug, Deserialize)]
struct ChatStreamQuery {
    /// Thread ID.
    thread_id: String,
}

/// GET /api/chat/stream - SSE stream of the persona reply.
async fn api_chat_stream(
    State(state): State<AppState>,
    Query(query): Query<ChatStreamQuery>,
) -> Response {
    let Some(thread) = state.chats.get(&query.thread_id) else {
        tracing::error!(thread_id = %query.thread_id, "Thread not found");
        return single_error_sse("Thread not found");
    };

    let turns = thread.turns();
    let orchestrator = std::sync::Arc::clone(&state.orchestrator);
    let thread_id = query.thread_id.clone();

    let sse_stream = async_stream::stream! {
        let stream = match orchestrator.chat_with_history(turns).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(
                    thread_id = %thread_id,
                    error = %e,
                    "Failed to start chat stream"
                );
                let err = StudioEvent::Error {
                    message: e.to_string(),
                    code: None,
                };
                yield Ok::<String, std::convert::Infallible>(sse_event(&err));
                yield Ok::<String, std::convert::Infallible>(sse_event(&StudioEvent::Done));
                return;
            }
        };

        // Accumulate the reply so the thread history stays complete.
        let mut reply = String::new();

        futures::pin_mut!(stream);
        while let Some(event) = stream.next().await {
            match &event {
                StudioEvent::MessageDelta { text } => {
                    reply.push_str(text);
                }
                StudioEvent::Done => {
                    if !reply.is_empty() {
                        thread.add_assistant_message(reply.clone());
                        info!(
                            thread_id = %thread_id,
                            reply_length = reply.len(),
                            "Saved persona reply to thread"
                        );
                    }
                }
                _ => {}
            }
            yield Ok::<String, std::convert::Infallible>(sse_event(&event));
        }
    };

    let body = axum::body::Body::from_stream(sse_stream);
    build_sse_response(body)
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn single_error_sse(message: &str) -> Response {
    let err = StudioEvent::Error {
        message: message.to_string(),
        code: None,
    };
    let done = StudioEvent::Done;

    let payload = format!("{}{}", sse_event(&err), sse_event(&done));
    let body = axum::body::Body::from(payload);
    build_sse_response(body)
}

fn build_sse_response(body: axum::body::Body) -> Response {
    let mut resp = Response::new(body);
    let h = resp.headers_mut();
    h.insert("Content-Type", "text/event-stream".parse().unwrap());
    h.insert("Cache-Control", "no-cache".parse().unwrap());
    h.insert("Connection", "keep-alive".parse().unwrap());
    h.insert("X-Accel-Buffering", "no".parse().unwrap());
    resp
}
