//! BoxConversationStore -- object-safe dynamic dispatch wrapper for ConversationStore.
//!
//! The store backend (SQLite vs in-memory) is a runtime config choice, but
//! `ConversationStore` uses RPITIT and cannot be a trait object directly.
//! Same blanket-impl pattern as `BoxLlmProvider`:
//! 1. Define an object-safe `ConversationStoreDyn` trait with boxed futures
//! 2. Blanket-impl `ConversationStoreDyn` for all `T: ConversationStore`
//! 3. `BoxConversationStore` wraps `Box<dyn ConversationStoreDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use parley_types::chat::Turn;
use parley_types::error::StoreError;
use uuid::Uuid;

use super::repository::ConversationStore;

/// Object-safe version of [`ConversationStore`] with boxed futures.
///
/// This trait exists solely to enable dynamic dispatch; a blanket
/// implementation is provided for all types implementing `ConversationStore`.
pub trait ConversationStoreDyn: Send + Sync {
    fn list_threads_boxed<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Uuid>, StoreError>> + Send + 'a>>;

    fn history_boxed<'a>(
        &'a self,
        thread_id: &'a Uuid,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Turn>, StoreError>> + Send + 'a>>;

    fn append_turn_boxed<'a>(
        &'a self,
        thread_id: &'a Uuid,
        turn: &'a Turn,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>>;
}

/// Blanket implementation: any `ConversationStore` automatically implements
/// `ConversationStoreDyn`.
impl<T: ConversationStore> ConversationStoreDyn for T {
    fn list_threads_boxed<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Uuid>, StoreError>> + Send + 'a>> {
        Box::pin(self.list_threads())
    }

    fn history_boxed<'a>(
        &'a self,
        thread_id: &'a Uuid,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Turn>, StoreError>> + Send + 'a>> {
        Box::pin(self.history(thread_id))
    }

    fn append_turn_boxed<'a>(
        &'a self,
        thread_id: &'a Uuid,
        turn: &'a Turn,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>> {
        Box::pin(self.append_turn(thread_id, turn))
    }
}

/// Type-erased conversation store for runtime backend selection.
///
/// Wraps any `ConversationStore` implementation behind dynamic dispatch so
/// the durable and volatile backends are interchangeable at startup.
pub struct BoxConversationStore {
    inner: Box<dyn ConversationStoreDyn + Send + Sync>,
}

impl BoxConversationStore {
    /// Wrap a concrete `ConversationStore` in a type-erased box.
    pub fn new<T: ConversationStore + 'static>(store: T) -> Self {
        Self {
            inner: Box::new(store),
        }
    }

    /// Every thread id that has at least one recorded turn.
    pub async fn list_threads(&self) -> Result<Vec<Uuid>, StoreError> {
        self.inner.list_threads_boxed().await
    }

    /// Full turn history for a thread, oldest first.
    pub async fn history(&self, thread_id: &Uuid) -> Result<Vec<Turn>, StoreError> {
        self.inner.history_boxed(thread_id).await
    }

    /// Append one immutable turn, creating the thread implicitly if needed.
    pub async fn append_turn(&self, thread_id: &Uuid, turn: &Turn) -> Result<(), StoreError> {
        self.inner.append_turn_boxed(thread_id, turn).await
    }
}
