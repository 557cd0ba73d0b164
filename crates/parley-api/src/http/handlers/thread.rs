//! Thread enumeration, creation, and history handlers.
//!
//! Endpoints:
//! - GET  /api/threads               - Enumerate known threads
//! - POST /api/thread/new            - Create and session-bind a new thread
//! - GET  /api/thread/{id}/messages  - Full history for a thread, oldest first

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::http::error::AppError;
use crate::http::extractors::session::ClientSession;
use crate::state::AppState;

/// Response body for GET /api/threads.
#[derive(Debug, Serialize)]
pub struct ThreadsResponse {
    pub threads: Vec<Uuid>,
}

/// GET /api/threads -- every thread with at least one recorded turn.
pub async fn list_threads(
    State(state): State<AppState>,
) -> Result<Json<ThreadsResponse>, AppError> {
    let threads = state
        .chat
        .list_threads()
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;
    Ok(Json(ThreadsResponse { threads }))
}

/// Response body for POST /api/thread/new.
#[derive(Debug, Serialize)]
pub struct NewThreadResponse {
    pub thread_id: Uuid,
}

/// POST /api/thread/new -- mint a thread id and bind it as the caller's
/// current thread.
///
/// Writes nothing to the store: the new thread stays invisible to
/// `/api/threads` until its first message.
pub async fn new_thread(
    State(state): State<AppState>,
    session: ClientSession,
) -> (HeaderMap, Json<NewThreadResponse>) {
    let thread_id = state.chat.new_thread();
    state.sessions.bind(session.token, thread_id);

    let mut headers = HeaderMap::new();
    session.set_cookie(&mut headers);
    (headers, Json(NewThreadResponse { thread_id }))
}

/// One message in the public wire format.
#[derive(Debug, Serialize)]
pub struct MessageDto {
    pub role: String,
    pub content: String,
}

/// Response body for GET /api/thread/{id}/messages.
#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<MessageDto>,
}

/// GET /api/thread/{id}/messages -- history oldest first.
///
/// An unknown thread id yields an empty list, and so does a thread whose
/// history cannot currently be loaded (degrade-on-read-failure).
pub async fn get_messages(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> Result<Json<MessagesResponse>, AppError> {
    let thread_id: Uuid = thread_id
        .parse()
        .map_err(|_| AppError::Validation("Invalid thread id format".to_string()))?;

    let messages = state
        .chat
        .get_messages(&thread_id)
        .await
        .into_iter()
        .map(|turn| MessageDto {
            role: turn.role.to_string(),
            content: turn.content,
        })
        .collect();

    Ok(Json(MessagesResponse { messages }))
}
