use crate::config::AppConfig;
use crate::db::{DatabaseTarget, GenerationStore};
use crate::error::AppResult;
use crate::imgbb::ImgbbClient;
use crate::orchestrator::Orchestrator;
use crate::together::TogetherClient;

pub type AppOrchestrator = Orchestrator<TogetherClient, ImgbbClient>;

/// Everything a request handler needs, built once at start.
pub struct AppState {
    pub orchestrator: AppOrchestrator,
}

impl AppState {
    /// Connects to the database, creates the schema and builds the clients.
    pub async fn from_config(config: &AppConfig) -> AppResult<Self> {
        let target = DatabaseTarget::parse(&config.database.url)?;
        let store = GenerationStore::connect(
            &target,
            config.database.pool_size,
            config.database.connect_retry,
        )
        .await?;
        store.ensure_schema().await?;

        let generator = TogetherClient::new(config.generation.clone());
        let host = ImgbbClient::new(config.hosting.clone())?;
        Ok(Self {
            orchestrator: Orchestrator::new(generator, host, store, config.call_retry),
        })
    }
}
