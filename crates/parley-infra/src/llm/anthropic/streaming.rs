//! SSE stream decoding for the Anthropic Messages API.
//!
//! Implements the streaming protocol described in the Anthropic docs:
//! 1. `message_start` -- Message object with initial usage
//! 2. Per block: `content_block_start` -> N x `content_block_delta` -> `content_block_stop`
//! 3. `message_delta` -- stop_reason
//! 4. `message_stop` -- final event
//! 5. `ping` events may appear anywhere (keepalive)
//! 6. `error` events may appear mid-stream
//!
//! The SSE body is decoded with `eventsource-stream` over the reqwest byte
//! stream, then each named event is mapped to the provider-agnostic
//! [`StreamEvent`] enum.

use std::pin::Pin;

use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt};
use secrecy::{ExposeSecret, SecretString};

use parley_types::llm::{LlmError, StreamEvent};

use super::client::{error_for_status, API_VERSION};
use super::types::{AnthropicDelta, AnthropicRequest, ContentBlockDeltaPayload, ErrorPayload};

/// Map one named SSE event to a provider-agnostic [`StreamEvent`].
///
/// Returns `Ok(None)` for events that carry nothing the caller needs
/// (`ping`, block boundaries, `message_delta`, non-text deltas).
fn map_sse_event(name: &str, data: &str) -> Result<Option<StreamEvent>, LlmError> {
    match name {
        "content_block_delta" => {
            let payload: ContentBlockDeltaPayload = serde_json::from_str(data)
                .map_err(|e| LlmError::Deserialization(format!("content_block_delta: {e}")))?;
            match payload.delta {
                AnthropicDelta::TextDelta { text } => Ok(Some(StreamEvent::TextDelta { text })),
                _ => Ok(None),
            }
        }
        "message_stop" => Ok(Some(StreamEvent::Done)),
        "error" => {
            let payload: ErrorPayload = serde_json::from_str(data)
                .map_err(|e| LlmError::Deserialization(format!("error event: {e}")))?;
            Err(LlmError::Provider {
                message: format!("{}: {}", payload.error.error_type, payload.error.message),
            })
        }
        // message_start, content_block_start, content_block_stop,
        // message_delta, ping
        _ => Ok(None),
    }
}

/// Create a streaming SSE connection to the Anthropic Messages API.
///
/// Returns a `Stream` of [`StreamEvent`]s: `Connected` once the HTTP
/// response arrives, `TextDelta` per text fragment, and `Done` at
/// `message_stop`.
///
/// # Arguments
///
/// * `client` - Shared reqwest HTTP client
/// * `url` - Full API URL (e.g., "https://api.anthropic.com/v1/messages")
/// * `body` - Serialized Anthropic request with `stream: true`
/// * `api_key` - API key wrapped in SecretString
pub fn create_anthropic_stream(
    client: &reqwest::Client,
    url: &str,
    body: AnthropicRequest,
    api_key: &SecretString,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
    let request = client
        .post(url)
        .header("x-api-key", api_key.expose_secret())
        .header("anthropic-version", API_VERSION)
        .header("content-type", "application/json")
        .json(&body);

    Box::pin(async_stream::try_stream! {
        let response = request.send().await.map_err(|e| LlmError::Provider {
            message: format!("HTTP request failed: {e}"),
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            Err(error_for_status(status.as_u16(), error_body))?;
            unreachable!();
        }

        yield StreamEvent::Connected;

        let mut events = response.bytes_stream().eventsource();
        while let Some(event) = events.next().await {
            let event = event.map_err(|e| LlmError::Stream(e.to_string()))?;
            if let Some(mapped) = map_sse_event(&event.event, &event.data)? {
                let done = matches!(mapped, StreamEvent::Done);
                yield mapped;
                if done {
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_text_delta() {
        let data = r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hi"}}"#;
        let event = map_sse_event("content_block_delta", data).unwrap();
        match event {
            Some(StreamEvent::TextDelta { text }) => assert_eq!(text, "Hi"),
            other => panic!("expected text delta, got {other:?}"),
        }
    }

    #[test]
    fn test_map_thinking_delta_is_skipped() {
        let data = r#"{"type":"content_block_delta","index":0,"delta":{"type":"thinking_delta","thinking":"hmm"}}"#;
        let event = map_sse_event("content_block_delta", data).unwrap();
        assert!(event.is_none());
    }

    #[test]
    fn test_map_message_stop() {
        let event = map_sse_event("message_stop", "{}").unwrap();
        assert!(matches!(event, Some(StreamEvent::Done)));
    }

    #[test]
    fn test_map_ping_and_boundaries_are_skipped() {
        for name in [
            "ping",
            "message_start",
            "content_block_start",
            "content_block_stop",
            "message_delta",
        ] {
            assert!(map_sse_event(name, "{}").unwrap().is_none(), "{name}");
        }
    }

    #[test]
    fn test_map_error_event() {
        let data = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        let err = map_sse_event("error", data).unwrap_err();
        match err {
            LlmError::Provider { message } => {
                assert_eq!(message, "overloaded_error: Overloaded");
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[test]
    fn test_map_malformed_delta_is_deserialization_error() {
        let err = map_sse_event("content_block_delta", "not json").unwrap_err();
        assert!(matches!(err, LlmError::Deserialization(_)));
    }
}
