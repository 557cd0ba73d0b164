//! Infrastructure layer for Parley.
//!
//! Contains implementations of the traits defined in `parley-core`: the
//! SQLite-backed and in-memory conversation stores, the Anthropic Messages
//! API provider, and the config loader.

pub mod config;
pub mod llm;
pub mod memory;
pub mod sqlite;
