use std::sync::Arc;

use biztime_infra::{InMemoryLedgerStore, Ledger, LedgerStore};

use crate::config::ApiConfig;

/// Ledger over whichever store was selected at start-up.
pub type SharedLedger = Ledger<Arc<dyn LedgerStore>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    InMemory,
    Postgres,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::InMemory => "in_memory",
            StoreBackend::Postgres => "postgres",
        }
    }
}

pub struct AppServices {
    ledger: SharedLedger,
    backend: StoreBackend,
}

impl AppServices {
    pub fn new(ledger: SharedLedger, backend: StoreBackend) -> Self {
        Self { ledger, backend }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory() -> Self {
        let store: Arc<dyn LedgerStore> = Arc::new(InMemoryLedgerStore::new());
        Self::new(Ledger::new(store), StoreBackend::InMemory)
    }

    pub fn ledger(&self) -> &SharedLedger {
        &self.ledger
    }

    pub fn backend(&self) -> StoreBackend {
        self.backend
    }
}

pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    if config.use_persistent_stores {
        #[cfg(feature = "postgres")]
        {
            return build_persistent_services(config).await;
        }
        #[cfg(not(feature = "postgres"))]
        {
            tracing::warn!(
                "USE_PERSISTENT_STORES=true but postgres feature not enabled, falling back to in-memory"
            );
        }
    }

    Ok(AppServices::in_memory())
}

#[cfg(feature = "postgres")]
async fn build_persistent_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    use anyhow::Context;
    use biztime_infra::PostgresLedgerStore;

    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set for persistent stores")?;

    let store = PostgresLedgerStore::connect(database_url, config.max_connections)
        .await
        .context("failed to connect to Postgres")?;

    if config.migrate {
        store.migrate().await.context("failed to apply ledger schema")?;
        tracing::info!("ledger schema applied");
    }

    let store: Arc<dyn LedgerStore> = Arc::new(store);
    Ok(AppServices::new(Ledger::new(store), StoreBackend::Postgres))
}
