//! In-memory conversation store.
//!
//! Volatile twin of the SQLite backend for deployments that accept history
//! loss on restart. Backed by a `DashMap`; the map's per-entry locking makes
//! each append atomic with respect to other appends on the same thread,
//! while appends to different threads touch different entries and proceed
//! independently.

use dashmap::DashMap;
use uuid::Uuid;

use parley_core::store::ConversationStore;
use parley_types::chat::Turn;
use parley_types::error::StoreError;

/// Volatile, process-local implementation of `ConversationStore`.
#[derive(Default)]
pub struct MemoryConversationStore {
    threads: DashMap<Uuid, Vec<Turn>>,
}

impl MemoryConversationStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConversationStore for MemoryConversationStore {
    async fn list_threads(&self) -> Result<Vec<Uuid>, StoreError> {
        Ok(self.threads.iter().map(|entry| *entry.key()).collect())
    }

    async fn history(&self, thread_id: &Uuid) -> Result<Vec<Turn>, StoreError> {
        Ok(self
            .threads
            .get(thread_id)
            .map(|turns| turns.clone())
            .unwrap_or_default())
    }

    async fn append_turn(&self, thread_id: &Uuid, turn: &Turn) -> Result<(), StoreError> {
        self.threads
            .entry(*thread_id)
            .or_default()
            .push(turn.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use parley_types::llm::MessageRole;

    #[tokio::test]
    async fn test_history_of_unknown_thread_is_empty() {
        let store = MemoryConversationStore::new();
        let history = store.history(&Uuid::new_v4()).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_append_and_history_round_trip() {
        let store = MemoryConversationStore::new();
        let thread_id = Uuid::new_v4();

        store
            .append_turn(&thread_id, &Turn::user(thread_id, "hi"))
            .await
            .unwrap();
        store
            .append_turn(&thread_id, &Turn::assistant(thread_id, "hello"))
            .await
            .unwrap();

        let history = store.history(&thread_id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, MessageRole::User);
        assert_eq!(history[1].role, MessageRole::Assistant);
        assert_eq!(history[1].content, "hello");
    }

    #[tokio::test]
    async fn test_list_threads_requires_at_least_one_turn() {
        let store = MemoryConversationStore::new();
        assert!(store.list_threads().await.unwrap().is_empty());

        let thread_id = Uuid::new_v4();
        store
            .append_turn(&thread_id, &Turn::user(thread_id, "hi"))
            .await
            .unwrap();
        assert_eq!(store.list_threads().await.unwrap(), vec![thread_id]);
    }

    #[tokio::test]
    async fn test_concurrent_appends_to_same_thread_all_land_intact() {
        let store = Arc::new(MemoryConversationStore::new());
        let thread_id = Uuid::new_v4();

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .append_turn(&thread_id, &Turn::user(thread_id, format!("turn-{i}")))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let history = store.history(&thread_id).await.unwrap();
        assert_eq!(history.len(), 32);

        let mut contents: Vec<String> =
            history.iter().map(|turn| turn.content.clone()).collect();
        contents.sort();
        let mut expected: Vec<String> = (0..32).map(|i| format!("turn-{i}")).collect();
        expected.sort();
        assert_eq!(contents, expected);
    }

    #[tokio::test]
    async fn test_appends_to_different_threads_are_independent() {
        let store = Arc::new(MemoryConversationStore::new());
        let thread_a = Uuid::new_v4();
        let thread_b = Uuid::new_v4();

        let a = {
            let store = store.clone();
            tokio::spawn(async move {
                for i in 0..10 {
                    store
                        .append_turn(&thread_a, &Turn::user(thread_a, format!("a{i}")))
                        .await
                        .unwrap();
                }
            })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move {
                for i in 0..10 {
                    store
                        .append_turn(&thread_b, &Turn::user(thread_b, format!("b{i}")))
                        .await
                        .unwrap();
                }
            })
        };
        a.await.unwrap();
        b.await.unwrap();

        assert_eq!(store.history(&thread_a).await.unwrap().len(), 10);
        assert_eq!(store.history(&thread_b).await.unwrap().len(), 10);
    }
}
