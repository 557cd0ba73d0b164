//! Chat orchestration for Parley.
//!
//! `ChatService` drives the single append-user-turn, call-model,
//! append-assistant-turn transition against the conversation store.
//! `SessionBindings` holds the ephemeral cookie-token-to-current-thread map.

pub mod service;
pub mod session;

pub use service::ChatService;
pub use session::SessionBindings;
