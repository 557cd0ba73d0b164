//! Conversation thread and turn types for Parley.
//!
//! A thread is an identified conversation holding an ordered, append-only
//! sequence of turns. Turns are immutable once appended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Re-export MessageRole from the llm module (it's used in both chat and llm contexts).
pub use crate::llm::MessageRole;

/// A single turn within a conversation thread.
///
/// Turns are ordered within a thread by store-observed append order and are
/// never edited or removed after the fact. The store is an accumulation log:
/// it records whatever sequence of roles it is given and does not enforce
/// user/assistant alternation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// Build a user turn for a thread.
    pub fn user(thread_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            thread_id,
            role: MessageRole::User,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Build an assistant turn for a thread.
    pub fn assistant(thread_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            thread_id,
            role: MessageRole::Assistant,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Events yielded by a streaming chat exchange.
///
/// The consumer sees zero or more `Chunk`s, then exactly one terminal event:
/// `Done` carrying the resolved thread id when the reply streamed to
/// completion and was persisted, or `Error` if the model call or the
/// assistant-turn write failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatStreamEvent {
    /// An incremental fragment of the model's reply text.
    Chunk(String),
    /// The reply completed and was recorded as one assistant turn.
    Done { thread_id: Uuid },
    /// The exchange failed; no assistant turn was recorded.
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_constructors_set_roles() {
        let thread_id = Uuid::new_v4();
        let user = Turn::user(thread_id, "hi");
        let assistant = Turn::assistant(thread_id, "hello");

        assert_eq!(user.role, MessageRole::User);
        assert_eq!(assistant.role, MessageRole::Assistant);
        assert_eq!(user.thread_id, thread_id);
        assert_eq!(assistant.thread_id, thread_id);
        assert_ne!(user.id, assistant.id);
    }

    #[test]
    fn test_turn_serialize_role_lowercase() {
        let turn = Turn::user(Uuid::new_v4(), "hi");
        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains("\"role\":\"user\""));
    }

    #[test]
    fn test_chat_stream_event_roundtrip() {
        let thread_id = Uuid::new_v4();
        for event in [
            ChatStreamEvent::Chunk("partial".to_string()),
            ChatStreamEvent::Done { thread_id },
            ChatStreamEvent::Error("boom".to_string()),
        ] {
            let json = serde_json::to_string(&event).unwrap();
            let parsed: ChatStreamEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(event, parsed);
        }
    }
}
