//! LLM provider implementations.
//!
//! Contains the concrete implementation of the [`LlmProvider`] trait
//! defined in `parley-core` for the Anthropic Messages API, and a factory
//! that constructs it from the environment-provided credential.
//!
//! [`LlmProvider`]: parley_core::llm::provider::LlmProvider

pub mod anthropic;

use secrecy::SecretString;

use parley_core::llm::BoxLlmProvider;
use parley_types::config::ModelConfig;
use parley_types::llm::LlmError;

use self::anthropic::AnthropicProvider;

/// Environment variable holding the completion API credential.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Build the completion provider from config plus the `ANTHROPIC_API_KEY`
/// environment variable.
///
/// # Errors
///
/// Returns [`LlmError::AuthenticationFailed`] when the variable is unset or
/// empty.
pub fn provider_from_env(model: &ModelConfig) -> Result<BoxLlmProvider, LlmError> {
    let key = std::env::var(API_KEY_ENV)
        .ok()
        .filter(|key| !key.is_empty())
        .ok_or(LlmError::AuthenticationFailed)?;

    let provider = AnthropicProvider::new(SecretString::from(key), model.name.clone());
    Ok(BoxLlmProvider::new(provider))
}
