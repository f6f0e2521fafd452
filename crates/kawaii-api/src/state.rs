//! Application state wiring all services together.
//!
//! Services are generic over repository traits; AppState pins them to the
//! concrete infra implementations.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use kawaii_core::chat::service::ChatService;
use kawaii_core::llm::completion::{CompletionClient, CompletionSettings};
use kawaii_core::llm::provider::SharedLlmProvider;
use kawaii_core::retention::sweeper::RetentionSweeper;
use kawaii_infra::llm::create_provider;
use kawaii_infra::secret::env::require_api_key;
use kawaii_infra::sqlite::conversation::SqliteConversationRepository;
use kawaii_infra::sqlite::pool::DatabasePool;
use kawaii_types::config::RelayConfig;

use crate::http::rate_limit::RateLimits;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteChatService = ChatService<SqliteConversationRepository>;

pub type ConcreteSweeper = RetentionSweeper<SqliteConversationRepository>;

/// Shared state handed to every HTTP handler.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub rate_limits: Arc<RateLimits>,
    pub config: Arc<RelayConfig>,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Wire services on top of an open pool and a provider.
    pub fn new(db_pool: DatabasePool, provider: SharedLlmProvider, config: RelayConfig) -> Self {
        let completion = CompletionClient::new(
            provider,
            CompletionSettings::from_config(&config.completion, &config.persona),
        );
        let chat_service = ChatService::new(
            SqliteConversationRepository::new(db_pool.clone()),
            completion,
        );

        Self {
            chat_service: Arc::new(chat_service),
            rate_limits: Arc::new(RateLimits::from_config(&config.rate_limit)),
            config: Arc::new(config),
            db_pool,
        }
    }

    /// Initialize the relay: read the API key, open the database, build the
    /// provider. Fails before touching the database if the key is missing.
    pub async fn init(data_dir: &Path, config: RelayConfig) -> anyhow::Result<Self> {
        let api_key = require_api_key(&config.completion.api_key_env)?;

        let db_pool = DatabasePool::open_in(data_dir)
            .await
            .with_context(|| format!("opening database in {}", data_dir.display()))?;

        let provider = create_provider(&config.completion, &api_key);
        Ok(Self::new(db_pool, provider, config))
    }

    /// Retention sweeper over the same database.
    pub fn sweeper(&self) -> ConcreteSweeper {
        RetentionSweeper::new(
            SqliteConversationRepository::new(self.db_pool.clone()),
            self.config.retention.max_age(),
        )
    }
}
