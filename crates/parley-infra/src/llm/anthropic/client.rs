//! AnthropicProvider -- concrete [`LlmProvider`] implementation for Anthropic Claude.
//!
//! Sends requests to the Anthropic Messages API (`/v1/messages`) with
//! proper authentication headers. Supports both non-streaming (`complete`)
//! and streaming (`stream`) modes.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::pin::Pin;
use std::time::Duration;

use futures_util::Stream;
use secrecy::{ExposeSecret, SecretString};

use parley_core::llm::provider::LlmProvider;
use parley_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, StopReason, StreamEvent,
};

use super::streaming::create_anthropic_stream;
use super::types::{
    AnthropicContentBlock, AnthropicMessage, AnthropicNonStreamResponse, AnthropicRequest,
};

/// The Anthropic API version header value.
pub(crate) const API_VERSION: &str = "2023-06-01";

/// Anthropic Claude LLM provider.
///
/// Implements [`LlmProvider`] for the Anthropic Messages API.
///
/// # API Key Security
///
/// The API key is stored as a [`SecretString`] and is only exposed when
/// constructing HTTP request headers. It never appears in Debug output,
/// Display output, or tracing logs.
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Anthropic API key wrapped in SecretString
    /// * `model` - Model identifier (e.g., "claude-sonnet-4-20250514")
    pub fn new(api_key: SecretString, model: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300)) // 5 min timeout for long generations
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            base_url: "https://api.anthropic.com".to_string(),
            model,
        }
    }

    /// The default model for this provider.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Build the full API URL for a given path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Convert a generic [`CompletionRequest`] into an [`AnthropicRequest`].
    fn to_anthropic_request(&self, request: &CompletionRequest, stream: bool) -> AnthropicRequest {
        let messages = request
            .messages
            .iter()
            .map(|m| AnthropicMessage {
                role: m.role.to_string(),
                content: m.content.clone(),
            })
            .collect();

        AnthropicRequest {
            model: request.model.clone(),
            max_tokens: request.max_tokens,
            messages,
            system: request.system.clone(),
            stream,
            temperature: request.temperature,
        }
    }
}

/// Map a non-success HTTP status to the corresponding [`LlmError`].
pub(crate) fn error_for_status(status: u16, body: String) -> LlmError {
    match status {
        400 => LlmError::InvalidRequest(body),
        401 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited {
            retry_after_ms: None,
        },
        529 => LlmError::Overloaded(body),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {body}"),
        },
    }
}

// AnthropicProvider intentionally does NOT derive Debug to prevent
// accidental exposure of internal state.

impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.to_anthropic_request(request, false);
        let url = self.url("/v1/messages");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(error_for_status(status.as_u16(), error_body));
        }

        let anthropic_resp: AnthropicNonStreamResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        // Extract text content from the response
        let content = anthropic_resp
            .content
            .iter()
            .map(|block| match block {
                AnthropicContentBlock::Text { text } => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("");

        let stop_reason = match anthropic_resp.stop_reason.as_deref() {
            Some("max_tokens") => StopReason::MaxTokens,
            Some("stop_sequence") => StopReason::StopSequence,
            _ => StopReason::EndTurn,
        };

        Ok(CompletionResponse {
            id: anthropic_resp.id,
            content,
            model: anthropic_resp.model,
            stop_reason,
        })
    }

    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        let body = self.to_anthropic_request(&request, true);
        let url = self.url("/v1/messages");

        create_anthropic_stream(&self.client, &url, body, &self.api_key)
    }
}
