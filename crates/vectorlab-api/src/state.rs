//! Application state wiring the providers and stores together.
//!
//! Core code is generic over the provider/store traits; AppState pins them
//! to the PostgreSQL implementations and the configured embedder.

use anyhow::Context;

use vectorlab_core::embedding::{BoxEmbedder, BoxTitleSummarizer};
use vectorlab_infra::embedding::{build_embedder, build_title_summarizer};
use vectorlab_infra::pg::{DatabasePool, PgConversationStore, PgSchemaManager};
use vectorlab_types::config::AppConfig;

pub struct AppState {
    pub config: AppConfig,
    pub db_pool: DatabasePool,
    pub schema: PgSchemaManager,
    pub store: PgConversationStore,
    pub embedder: BoxEmbedder,
    pub titles: BoxTitleSummarizer,
}

impl AppState {
    /// Build providers, then connect to PostgreSQL.
    ///
    /// Provider configuration errors (e.g. a missing API key) surface before
    /// any connection attempt.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let (embedder, titles) = build_providers(&config)?;
        let db_pool = DatabasePool::connect(&config.database)
            .await
            .context("failed to connect to PostgreSQL")?;
        Self::assemble(config, db_pool, embedder, titles)
    }

    /// Like [`AppState::init`] but without connecting up front; used by
    /// `status`, which reports connectivity instead of failing on it.
    pub fn init_lazy(config: AppConfig) -> anyhow::Result<Self> {
        let (embedder, titles) = build_providers(&config)?;
        let db_pool = DatabasePool::connect_lazy(&config.database)
            .context("invalid database settings")?;
        Self::assemble(config, db_pool, embedder, titles)
    }

    fn assemble(
        config: AppConfig,
        db_pool: DatabasePool,
        embedder: BoxEmbedder,
        titles: BoxTitleSummarizer,
    ) -> anyhow::Result<Self> {
        let db = &config.database;
        let dimension = config.embedding.dimension;

        let schema = PgSchemaManager::new(db_pool.clone(), db.table.clone(), dimension)?
            .with_metric(db.metric);
        let store = PgConversationStore::new(db_pool.clone(), db.table.clone(), dimension)?
            .with_metric(db.metric);

        Ok(Self {
            config,
            db_pool,
            schema,
            store,
            embedder,
            titles,
        })
    }
}

fn build_providers(config: &AppConfig) -> anyhow::Result<(BoxEmbedder, BoxTitleSummarizer)> {
    let embedder = build_embedder(config).context("failed to configure embedding provider")?;
    let titles = build_title_summarizer(config).context("failed to configure title model")?;
    Ok((embedder, titles))
}
