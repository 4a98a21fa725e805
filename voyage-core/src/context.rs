use std::sync::Arc;
use crate::config::{Config, StoreBackend};
use crate::db::{create_pool, run_migrations};
use crate::seed::seed_sample_destinations;
use crate::store::Stores;

#[derive(Clone)]
pub struct TravelContext {
    pub config: Arc<Config>,
    pub stores: Stores,
}

impl TravelContext {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let stores = match config.store.backend {
            StoreBackend::Postgres => {
                let pool = create_pool(&config.database).await?;
                run_migrations(&config.database).await?;
                Stores::postgres(pool)
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store, data will not survive a restart");
                Stores::memory()
            }
        };

        if config.store.seed_sample_data {
            let seeded = seed_sample_destinations(&stores).await?;
            if seeded > 0 {
                tracing::info!("Seeded {} sample destinations", seeded);
            }
        }

        Ok(Self::with_stores(config, stores))
    }

    pub fn with_stores(config: Config, stores: Stores) -> Self {
        TravelContext {
            config: Arc::new(config),
            stores,
        }
    }

    /// Fresh in-memory context, used by tests across the workspace.
    pub fn in_memory() -> Self {
        Self::with_stores(Config::in_memory(), Stores::memory())
    }
}
