//! Chat endpoints: synchronous exchange and SSE streaming.
//!
//! Endpoints:
//! - POST /api/chat         - Whole-reply exchange
//! - POST /api/chat/stream  - Incremental reply as Server-Sent Events
//!
//! SSE wire format (default event type, JSON data lines):
//! - `data: {"chunk": text}`                     -- one fragment
//! - `data: {"done": true, "thread_id": id}`     -- terminal success marker
//! - `data: {"error": message}`                  -- terminal failure marker

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::Json;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use parley_types::chat::ChatStreamEvent;

use crate::http::error::AppError;
use crate::http::extractors::session::ClientSession;
use crate::state::AppState;

/// Request body for both chat endpoints.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user message to append and send to the model.
    pub message: String,
    /// Existing thread to continue; if absent, the session-bound thread or
    /// a freshly generated one is used.
    pub thread_id: Option<String>,
}

/// Response body for POST /api/chat.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub thread_id: Uuid,
}

/// Resolve the effective thread id: explicit request value, then the
/// caller's session-bound current thread, then a newly generated id (which
/// becomes session-bound).
fn resolve_thread(
    state: &AppState,
    session: &ClientSession,
    explicit: Option<&str>,
) -> Result<Uuid, AppError> {
    if let Some(raw) = explicit {
        return raw
            .parse()
            .map_err(|_| AppError::Validation("Invalid thread_id format".to_string()));
    }

    if let Some(thread_id) = state.sessions.current(&session.token) {
        return Ok(thread_id);
    }

    let thread_id = state.chat.new_thread();
    state.sessions.bind(session.token, thread_id);
    Ok(thread_id)
}

/// POST /api/chat -- run one exchange and return the whole reply.
pub async fn chat(
    State(state): State<AppState>,
    session: ClientSession,
    Json(body): Json<ChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    let thread_id = resolve_thread(&state, &session, body.thread_id.as_deref())?;

    let response = state.chat.send_message(thread_id, &body.message).await?;

    let mut headers = HeaderMap::new();
    session.set_cookie(&mut headers);
    Ok((
        headers,
        Json(ChatResponse {
            response,
            thread_id,
        }),
    ))
}

/// POST /api/chat/stream -- run one exchange, forwarding the reply as SSE
/// fragments.
///
/// Validation and the user-turn append happen before the response starts,
/// so those failures arrive as ordinary JSON error responses. Once the
/// stream is running, failures arrive as a terminal `error` data line. A
/// client that disconnects mid-stream stops the fragment loop and no
/// assistant turn is recorded.
pub async fn chat_stream(
    State(state): State<AppState>,
    session: ClientSession,
    Json(body): Json<ChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    let thread_id = resolve_thread(&state, &session, body.thread_id.as_deref())?;

    let stream = state
        .chat
        .clone()
        .send_message_streaming(thread_id, body.message)
        .await?;

    let sse_stream = stream.map(|event| {
        let data = match event {
            ChatStreamEvent::Chunk(text) => json!({ "chunk": text }),
            ChatStreamEvent::Done { thread_id } => {
                json!({ "done": true, "thread_id": thread_id })
            }
            ChatStreamEvent::Error(message) => json!({ "error": message }),
        };
        Ok::<_, Infallible>(Event::default().data(data.to_string()))
    });

    let mut headers = HeaderMap::new();
    session.set_cookie(&mut headers);
    Ok((
        headers,
        Sse::new(sse_stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))),
    ))
}
