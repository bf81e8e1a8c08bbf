use std::sync::Arc;

use db::{DbError, JsonDirStore, MemoryStore, MoodRepository, SessionRepository, SharedStore, SqliteStore};
use inference::{InferenceClient, InferenceGateway};
use orchestrator::{ChatService, Enricher};
use tracing::info;

use crate::config::{ServerConfig, StorageKind};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub sessions: SessionRepository,
    pub moods: MoodRepository,
    pub chat: ChatService,
}

impl AppState {
    /// Wires repositories and the chat service over an already opened store.
    pub async fn new(
        config: ServerConfig,
        store: SharedStore,
        gateway: Arc<dyn InferenceGateway>,
    ) -> Self {
        let sessions = SessionRepository::load(store.clone()).await;
        let moods = MoodRepository::load(store).await;
        let chat = ChatService::new(gateway, sessions.clone(), Enricher::new());

        Self {
            config: Arc::new(config),
            sessions,
            moods,
            chat,
        }
    }

    /// Opens the configured store and talks to the configured endpoint.
    pub async fn from_config(config: ServerConfig) -> Result<Self, DbError> {
        let store = open_store(&config).await?;
        let gateway = Arc::new(InferenceClient::new(&config.api_url, &config.api_key));
        Ok(Self::new(config, store, gateway).await)
    }
}

pub async fn open_store(config: &ServerConfig) -> Result<SharedStore, DbError> {
    let store: SharedStore = match config.storage {
        StorageKind::Sqlite => {
            tokio::fs::create_dir_all(&config.data_dir).await?;
            let url = format!("sqlite:{}", config.database_path().display());
            Arc::new(SqliteStore::connect(&url).await?)
        }
        StorageKind::Json => Arc::new(JsonDirStore::new(config.json_store_dir())),
        StorageKind::Memory => Arc::new(MemoryStore::new()),
    };

    info!(backend = store.name(), data_dir = %config.data_dir.display(), "Storage opened");
    Ok(store)
}
