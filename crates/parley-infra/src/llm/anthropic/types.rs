//! Anthropic Messages API types.
//!
//! These are Anthropic-specific request/response structures used for HTTP
//! communication with the Anthropic Messages API. They are NOT the generic
//! LLM types from parley-types -- those are provider-agnostic.

use serde::{Deserialize, Serialize};

/// Request body for the Anthropic Messages API.
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// A single message in an Anthropic conversation.
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicMessage {
    pub role: String,
    pub content: String,
}

// ---------------------------------------------------------------------------
// SSE event payload structs
//
// The Anthropic SSE stream uses the `event:` field to name the event type
// (e.g., "message_start", "content_block_delta") and the `data:` field
// contains JSON. We deserialize each payload into a specific struct based
// on the event type string -- NOT via serde tag on an outer enum.
// ---------------------------------------------------------------------------

/// Payload for `event: content_block_delta`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlockDeltaPayload {
    pub delta: AnthropicDelta,
}

/// Delta types within a content block.
///
/// Only text deltas carry conversational content here; thinking and
/// signature deltas can appear on some models and are skipped.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum AnthropicDelta {
    #[serde(rename = "text_delta")]
    TextDelta { text: String },
    #[serde(rename = "thinking_delta")]
    ThinkingDelta { thinking: String },
    #[serde(rename = "signature_delta")]
    SignatureDelta { signature: String },
}

/// Payload for `event: error`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorPayload {
    pub error: AnthropicError,
}

/// An error from the Anthropic API.
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicError {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

/// A content block in an Anthropic response.
///
/// Tool-use blocks never appear because this backend sends no tool
/// definitions.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum AnthropicContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
}

/// Non-streaming response from the Anthropic Messages API.
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicNonStreamResponse {
    pub id: String,
    pub content: Vec<AnthropicContentBlock>,
    pub model: String,
    pub stop_reason: Option<String>,
}
