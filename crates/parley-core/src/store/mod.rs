//! Conversation store abstractions for Parley.
//!
//! This module defines the `ConversationStore` trait that the infrastructure
//! layer implements (SQLite-durable or in-memory-volatile), and the
//! `BoxConversationStore` wrapper used for runtime backend selection.

pub mod box_store;
pub mod repository;

pub use box_store::BoxConversationStore;
pub use repository::ConversationStore;
