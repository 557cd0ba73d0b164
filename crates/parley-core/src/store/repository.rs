//! ConversationStore trait definition.
//!
//! Provides append and retrieval operations for per-thread turn history.
//! Uses native async fn in traits (RPITIT, Rust 2024 edition); concrete
//! implementations live in parley-infra.

use parley_types::chat::Turn;
use parley_types::error::StoreError;
use uuid::Uuid;

/// Store trait for per-thread, append-only conversation history.
///
/// A thread "exists" exactly when it has at least one recorded turn; a
/// thread id that was never written is indistinguishable from one with no
/// history yet. Implementations must make `append_turn` atomic with respect
/// to concurrent appends to the *same* thread -- two concurrent appends must
/// not interleave or drop a turn. Appends to different threads are
/// independent.
pub trait ConversationStore: Send + Sync {
    /// Every thread id that has at least one recorded turn. No ordering
    /// guarantee.
    fn list_threads(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Uuid>, StoreError>> + Send;

    /// Full turn history for a thread, oldest first. Unknown thread ids
    /// yield an empty sequence, not an error.
    fn history(
        &self,
        thread_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<Turn>, StoreError>> + Send;

    /// Append one immutable turn, creating the thread implicitly if needed.
    fn append_turn(
        &self,
        thread_id: &Uuid,
        turn: &Turn,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
