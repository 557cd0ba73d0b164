//! SQLite conversation store implementation.
//!
//! Implements `ConversationStore` from `parley-core` using sqlx with split
//! read/write pools: raw queries, a private Row struct for SQLite-to-domain
//! mapping, reads on the reader pool, appends on the single-connection
//! writer pool.

use parley_core::store::ConversationStore;
use parley_types::chat::Turn;
use parley_types::error::StoreError;
use parley_types::llm::MessageRole;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// Durable, SQLite-backed implementation of `ConversationStore`.
pub struct SqliteConversationStore {
    pool: DatabasePool,
}

impl SqliteConversationStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row type for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct TurnRow {
    id: String,
    thread_id: String,
    role: String,
    content: String,
    created_at: String,
}

impl TurnRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            thread_id: row.try_get("thread_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_turn(self) -> Result<Turn, StoreError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| StoreError::Corrupt(format!("invalid turn id: {e}")))?;
        let thread_id = Uuid::parse_str(&self.thread_id)
            .map_err(|e| StoreError::Corrupt(format!("invalid thread_id: {e}")))?;
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| StoreError::Corrupt(e))?;
        let created_at = parse_datetime(&self.created_at)?;

        Ok(Turn {
            id,
            thread_id,
            role,
            content: self.content,
            created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

// ---------------------------------------------------------------------------
// ConversationStore implementation
// ---------------------------------------------------------------------------

impl ConversationStore for SqliteConversationStore {
    async fn list_threads(&self) -> Result<Vec<Uuid>, StoreError> {
        let rows = sqlx::query("SELECT DISTINCT thread_id FROM turns")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut threads = Vec::with_capacity(rows.len());
        for row in &rows {
            let thread_id: String = row
                .try_get("thread_id")
                .map_err(|e| StoreError::Query(e.to_string()))?;
            threads.push(
                Uuid::parse_str(&thread_id)
                    .map_err(|e| StoreError::Corrupt(format!("invalid thread_id: {e}")))?,
            );
        }

        Ok(threads)
    }

    async fn history(&self, thread_id: &Uuid) -> Result<Vec<Turn>, StoreError> {
        // seq is the append counter; ordering by it reproduces the exact
        // order the writer connection observed.
        let rows = sqlx::query(
            "SELECT id, thread_id, role, content, created_at FROM turns WHERE thread_id = ? ORDER BY seq ASC",
        )
        .bind(thread_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut turns = Vec::with_capacity(rows.len());
        for row in &rows {
            let turn_row =
                TurnRow::from_row(row).map_err(|e| StoreError::Query(e.to_string()))?;
            turns.push(turn_row.into_turn()?);
        }

        Ok(turns)
    }

    async fn append_turn(&self, thread_id: &Uuid, turn: &Turn) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO turns (id, thread_id, role, content, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(turn.id.to_string())
        .bind(thread_id.to_string())
        .bind(turn.role.to_string())
        .bind(&turn.content)
        .bind(format_datetime(&turn.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    async fn make_store(dir: &tempfile::TempDir) -> SqliteConversationStore {
        let db_path = dir.path().join("turns.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = DatabasePool::new(&url).await.unwrap();
        SqliteConversationStore::new(pool)
    }

    #[tokio::test]
    async fn test_history_of_unknown_thread_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir).await;

        let history = store.history(&Uuid::new_v4()).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_append_and_history_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir).await;
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
        assert_eq!(history[0].content, "hi");
        assert_eq!(history[1].role, MessageRole::Assistant);
        assert_eq!(history[1].content, "hello");
    }

    #[tokio::test]
    async fn test_list_threads_requires_at_least_one_turn() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir).await;

        // A generated-but-never-written id is invisible.
        let unwritten = Uuid::new_v4();
        assert!(store.list_threads().await.unwrap().is_empty());

        let written = Uuid::new_v4();
        store
            .append_turn(&written, &Turn::user(written, "hi"))
            .await
            .unwrap();

        let threads = store.list_threads().await.unwrap();
        assert_eq!(threads, vec![written]);
        assert!(!threads.contains(&unwritten));
    }

    #[tokio::test]
    async fn test_list_threads_deduplicates() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(&dir).await;
        let thread_id = Uuid::new_v4();

        for content in ["a", "b", "c"] {
            store
                .append_turn(&thread_id, &Turn::user(thread_id, content))
                .await
                .unwrap();
        }

        assert_eq!(store.list_threads().await.unwrap(), vec![thread_id]);
    }

    #[tokio::test]
    async fn test_concurrent_appends_to_same_thread_all_land_intact() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(make_store(&dir).await);
        let thread_id = Uuid::new_v4();

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let content = format!("turn-{i}");
                store
                    .append_turn(&thread_id, &Turn::user(thread_id, content))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let history = store.history(&thread_id).await.unwrap();
        assert_eq!(history.len(), 16);

        // Every turn arrived whole; no interleaved or truncated content.
        let mut contents: Vec<String> =
            history.iter().map(|turn| turn.content.clone()).collect();
        contents.sort();
        let mut expected: Vec<String> = (0..16).map(|i| format!("turn-{i}")).collect();
        expected.sort();
        assert_eq!(contents, expected);
    }

    #[tokio::test]
    async fn test_appends_to_different_threads_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(make_store(&dir).await);
        let thread_a = Uuid::new_v4();
        let thread_b = Uuid::new_v4();

        let mut handles = Vec::new();
        for (thread_id, count) in [(thread_a, 5), (thread_b, 3)] {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..count {
                    store
                        .append_turn(&thread_id, &Turn::user(thread_id, format!("m{i}")))
                        .await
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.history(&thread_a).await.unwrap().len(), 5);
        assert_eq!(store.history(&thread_b).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_history_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let thread_id = Uuid::new_v4();

        {
            let store = make_store(&dir).await;
            store
                .append_turn(&thread_id, &Turn::user(thread_id, "persist me"))
                .await
                .unwrap();
        }

        let store = make_store(&dir).await;
        let history = store.history(&thread_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, "persist me");
    }
}
