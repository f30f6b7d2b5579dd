//! HTTP server
//!
//! Builds the axum router serving the chat endpoints and owns the shared
//! application state. The stores and the provider are constructed once at
//! startup and injected into handlers through [`AppState`]; there is no
//! process-wide mutable state anywhere in the crate.

mod handlers;

pub use handlers::{ChatHistoryRequest, ChatReply, SaveChatReply, SaveChatRequest};

use crate::config::Config;
use crate::error::Result;
use crate::providers::{ChatProvider, OpenAiProvider};
use crate::storage::{ChatArchive, MemoryStore};

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    /// Upstream completion boundary
    pub provider: Arc<dyn ChatProvider>,
    /// Saved-session store
    pub archive: ChatArchive,
    /// Long-term memory store
    pub memory: MemoryStore,
    /// Record a memory summary after each successful chat exchange
    pub memory_enabled: bool,
}

impl AppState {
    /// Builds the state from configuration
    ///
    /// Constructs the provider client and the two flat-file stores, and
    /// makes sure the data directory exists. This is the whole init
    /// lifecycle; the stores hold no open handles, so there is nothing to
    /// tear down.
    pub fn from_config(config: &Config) -> Result<Self> {
        let data_dir = config.storage.resolve_data_dir();
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!("Using data directory {}", data_dir.display());

        Ok(Self {
            provider: Arc::new(OpenAiProvider::new(&config.provider)?),
            archive: ChatArchive::new(config.storage.archive_path()),
            memory: MemoryStore::new(config.storage.memory_path()),
            memory_enabled: config.memory.enabled,
        })
    }

    /// Builds state around an existing provider (used by tests)
    pub fn with_provider(
        provider: Arc<dyn ChatProvider>,
        archive: ChatArchive,
        memory: MemoryStore,
        memory_enabled: bool,
    ) -> Self {
        Self {
            provider,
            archive,
            memory,
            memory_enabled,
        }
    }
}

/// Builds the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/chat", post(handlers::chat))
        .route("/api/list-chats", get(handlers::list_chats))
        .route("/api/load-chat", get(handlers::load_chat))
        .route("/api/save-chat", post(handlers::save_chat))
        .with_state(state)
}

/// Runs the server until interrupted
///
/// Binds the configured listen address and serves requests, shutting down
/// cleanly on ctrl-c.
pub async fn run(config: &Config) -> Result<()> {
    let state = AppState::from_config(config)?;
    let listener = tokio::net::TcpListener::bind(&config.server.listen).await?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Could not install ctrl-c handler: {}", e);
        return;
    }
    tracing::info!("Shutting down");
}
