//! LlmProvider trait definition.
//!
//! This is the abstraction over the hosted completion API. Uses RPITIT for
//! `complete`, and `Pin<Box<dyn Stream>>` for `stream` (streams need to be
//! object-safe for the BoxLlmProvider wrapper).

use std::pin::Pin;

use futures_util::Stream;

use parley_types::llm::{CompletionRequest, CompletionResponse, LlmError, StreamEvent};

/// Trait for completion provider backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition) for
/// `complete`. The `stream` method returns a boxed stream because streams
/// need to be object-safe for `BoxLlmProvider`.
///
/// Implementations live in parley-infra (e.g., `AnthropicProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "anthropic").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;

    /// Send a streaming completion request. Returns a stream of events.
    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>>;
}
