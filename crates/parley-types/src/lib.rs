//! Shared domain types for Parley.
//!
//! This crate contains the core domain types used across the Parley chat
//! backend: conversation turns, LLM request/response shapes, stream events,
//! configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
