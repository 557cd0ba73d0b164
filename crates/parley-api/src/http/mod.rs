//! HTTP/REST API layer for Parley.
//!
//! Axum-based JSON API at `/api/` with cookie session binding, SSE chat
//! streaming, and CORS support.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
