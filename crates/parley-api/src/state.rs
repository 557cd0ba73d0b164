//! Application state wiring all services together.
//!
//! AppState holds the chat service and session bindings used by the HTTP
//! handlers and CLI commands. Everything is explicitly constructed here --
//! config decides the store backend, the environment supplies the provider
//! credential -- and injected; nothing is referenced as an ambient global.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parley_core::chat::{ChatService, SessionBindings};
use parley_core::store::BoxConversationStore;
use parley_infra::config::database_url;
use parley_infra::llm::provider_from_env;
use parley_infra::memory::MemoryConversationStore;
use parley_infra::sqlite::conversation::SqliteConversationStore;
use parley_infra::sqlite::pool::DatabasePool;
use parley_types::config::{AppConfig, StoreBackend};

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub sessions: Arc<SessionBindings>,
    pub data_dir: PathBuf,
}

/// Open the conversation store backend selected in config.
///
/// Creates the SQLite database and runs migrations when durable storage is
/// selected.
pub async fn open_store(
    config: &AppConfig,
    data_dir: &Path,
) -> anyhow::Result<BoxConversationStore> {
    match config.store.backend {
        StoreBackend::Sqlite => {
            tokio::fs::create_dir_all(data_dir).await?;
            let pool = DatabasePool::new(&database_url(data_dir)).await?;
            Ok(BoxConversationStore::new(SqliteConversationStore::new(
                pool,
            )))
        }
        StoreBackend::Memory => {
            tracing::info!("using in-memory conversation store; history is lost on restart");
            Ok(BoxConversationStore::new(MemoryConversationStore::new()))
        }
    }
}

impl AppState {
    /// Initialize the application state from a loaded config.
    ///
    /// Opens the configured store backend and constructs the completion
    /// provider from the environment credential.
    pub async fn init(config: &AppConfig, data_dir: PathBuf) -> anyhow::Result<Self> {
        let store = open_store(config, &data_dir).await?;

        let provider = provider_from_env(&config.model)
            .map_err(|e| anyhow::anyhow!("completion provider init failed: {e}"))?;

        let chat = ChatService::new(store, provider, config.model.clone());

        Ok(Self {
            chat: Arc::new(chat),
            sessions: Arc::new(SessionBindings::new(config.session.ttl_minutes)),
            data_dir,
        })
    }
}
