//! Chat service orchestrating one request/response cycle.
//!
//! ChatService drives the single linear transition of the backend: read
//! prior history, append the user turn, invoke the model with the full
//! ordered history, append the model's reply turn. The store and provider
//! are injected at construction; the service holds no persistent state of
//! its own and treats the store as the single source of truth.

use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use tracing::warn;
use uuid::Uuid;

use parley_types::chat::{ChatStreamEvent, Turn};
use parley_types::config::ModelConfig;
use parley_types::error::{ChatError, StoreError};
use parley_types::llm::{CompletionRequest, Message, MessageRole, StreamEvent};

use crate::llm::BoxLlmProvider;
use crate::store::BoxConversationStore;

/// Orchestrates chat exchanges against the conversation store and the
/// remote completion provider.
pub struct ChatService {
    store: BoxConversationStore,
    provider: BoxLlmProvider,
    model: ModelConfig,
}

impl ChatService {
    /// Create a new chat service with the given store, provider, and model
    /// settings.
    pub fn new(store: BoxConversationStore, provider: BoxLlmProvider, model: ModelConfig) -> Self {
        Self {
            store,
            provider,
            model,
        }
    }

    /// Access the conversation store.
    pub fn store(&self) -> &BoxConversationStore {
        &self.store
    }

    /// Generate a fresh, globally-unique thread identifier.
    ///
    /// Writes nothing: an empty thread is indistinguishable from no thread
    /// until its first turn is appended.
    pub fn new_thread(&self) -> Uuid {
        Uuid::new_v4()
    }

    /// Every thread id with at least one recorded turn.
    pub async fn list_threads(&self) -> Result<Vec<Uuid>, StoreError> {
        self.store.list_threads().await
    }

    /// Full turn history for a thread, oldest first.
    ///
    /// A retrieval failure degrades to an empty history: a conversation that
    /// cannot be loaded is treated as a fresh conversation rather than a
    /// fatal error. The failure is still logged so outages stay observable.
    pub async fn get_messages(&self, thread_id: &Uuid) -> Vec<Turn> {
        match self.store.history(thread_id).await {
            Ok(turns) => turns,
            Err(e) => {
                warn!(thread_id = %thread_id, error = %e, "history read failed, treating thread as empty");
                Vec::new()
            }
        }
    }

    /// Run one synchronous exchange: append the user turn, call the model,
    /// append the reply turn, return the reply text.
    ///
    /// Store write failures propagate as [`ChatError::Storage`]; losing a
    /// user's message silently is not acceptable. Provider failures surface
    /// as [`ChatError::Model`] carrying only the underlying message text.
    pub async fn send_message(&self, thread_id: Uuid, message: &str) -> Result<String, ChatError> {
        if message.is_empty() {
            return Err(ChatError::Validation("Message is required".to_string()));
        }

        let prior = self.get_messages(&thread_id).await;

        let user_turn = Turn::user(thread_id, message);
        self.store.append_turn(&thread_id, &user_turn).await?;

        let request = self.build_request(&prior, message, false);
        let response = self
            .provider
            .complete(&request)
            .await
            .map_err(|e| ChatError::Model(e.to_string()))?;

        let assistant_turn = Turn::assistant(thread_id, response.content.clone());
        self.store.append_turn(&thread_id, &assistant_turn).await?;

        Ok(response.content)
    }

    /// Run one streaming exchange.
    ///
    /// Validation and the user-turn append happen before the stream is
    /// returned, so those failures surface as an immediate `Err` rather than
    /// an event. The returned stream forwards each text fragment as a
    /// [`ChatStreamEvent::Chunk`] as soon as the provider yields it, then
    /// appends the full accumulated reply as one assistant turn and ends
    /// with [`ChatStreamEvent::Done`]. If the caller drops the stream before
    /// completion, the append never runs: a truncated reply is not recorded
    /// as history.
    pub async fn send_message_streaming(
        self: Arc<Self>,
        thread_id: Uuid,
        message: String,
    ) -> Result<impl Stream<Item = ChatStreamEvent> + Send + 'static, ChatError> {
        if message.is_empty() {
            return Err(ChatError::Validation("Message is required".to_string()));
        }

        let prior = self.get_messages(&thread_id).await;

        let user_turn = Turn::user(thread_id, message.clone());
        self.store.append_turn(&thread_id, &user_turn).await?;

        let request = self.build_request(&prior, &message, true);

        Ok(async_stream::stream! {
            let mut llm_stream = self.provider.stream(request);
            let mut full_response = String::new();
            let mut had_error = false;

            while let Some(event) = llm_stream.next().await {
                match event {
                    Ok(StreamEvent::TextDelta { text }) => {
                        full_response.push_str(&text);
                        yield ChatStreamEvent::Chunk(text);
                    }
                    Ok(StreamEvent::Done) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!(thread_id = %thread_id, error = %e, "model stream failed");
                        yield ChatStreamEvent::Error(e.to_string());
                        had_error = true;
                        break;
                    }
                }
            }

            // Persist only when the provider stream ran to completion; a
            // failed or dropped stream must not record a truncated reply.
            if !had_error {
                let assistant_turn = Turn::assistant(thread_id, full_response);
                match self.store.append_turn(&thread_id, &assistant_turn).await {
                    Ok(()) => yield ChatStreamEvent::Done { thread_id },
                    Err(e) => {
                        warn!(thread_id = %thread_id, error = %e, "failed to record assistant turn");
                        yield ChatStreamEvent::Error(e.to_string());
                    }
                }
            }
        })
    }

    /// Build a completion request from prior turns plus the new user message.
    fn build_request(&self, prior: &[Turn], message: &str, stream: bool) -> CompletionRequest {
        let mut messages: Vec<Message> = prior
            .iter()
            .map(|turn| Message {
                role: turn.role.clone(),
                content: turn.content.clone(),
            })
            .collect();

        messages.push(Message {
            role: MessageRole::User,
            content: message.to_string(),
        });

        CompletionRequest {
            model: self.model.name.clone(),
            messages,
            system: self.model.system.clone(),
            max_tokens: self.model.max_tokens,
            temperature: self.model.temperature,
            stream,
        }
    }
}
