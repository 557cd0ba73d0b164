//! Business logic and trait definitions for Parley.
//!
//! This crate defines the "ports" (the conversation store and LLM provider
//! traits) that the infrastructure layer implements, plus the chat session
//! service that orchestrates one request/response cycle against them. It
//! depends only on `parley-types` -- never on `parley-infra` or any
//! database/IO crate.

pub mod chat;
pub mod llm;
pub mod store;
