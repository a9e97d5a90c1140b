//! Store traits and the bundle the rest of the service is wired with.

pub mod memory;
pub mod traits;

use std::sync::Arc;

use tracing::{info, warn};

use chatdesk_core::config::{DatabaseConfig, DatabaseProvider};
use chatdesk_core::result::AppResult;
use chatdesk_entity::user::UserRole;

use crate::connection::DatabasePool;
use crate::migration::run_migrations;
use crate::repositories::{ActivityRepository, SessionLedgerRepository, UserRepository};

pub use memory::MemoryStore;
pub use traits::{AccountDirectory, AcquireOutcome, ActivityLog, ReleaseOutcome, SessionLedger};

/// The three persistence collaborators, behind trait objects.
#[derive(Clone)]
pub struct Stores {
    /// Single-session ledger.
    pub ledger: Arc<dyn SessionLedger>,
    /// Account lookups.
    pub directory: Arc<dyn AccountDirectory>,
    /// Activity records.
    pub activity: Arc<dyn ActivityLog>,
    pool: Option<DatabasePool>,
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores")
            .field("postgres", &self.pool.is_some())
            .finish_non_exhaustive()
    }
}

impl Stores {
    /// Wire every collaborator to one in-memory store.
    pub fn memory(store: MemoryStore) -> Self {
        let shared = Arc::new(store);
        Self {
            ledger: shared.clone(),
            directory: shared.clone(),
            activity: shared,
            pool: None,
        }
    }

    /// Wire every collaborator to PostgreSQL repositories over `pool`.
    pub fn postgres(pool: DatabasePool) -> Self {
        let pg = pool.pool().clone();
        Self {
            ledger: Arc::new(SessionLedgerRepository::new(pg.clone())),
            directory: Arc::new(UserRepository::new(pg.clone())),
            activity: Arc::new(ActivityRepository::new(pg)),
            pool: Some(pool),
        }
    }

    /// Open the configured backend, migrate it, and create seed accounts.
    pub async fn open(config: &DatabaseConfig) -> AppResult<Self> {
        let stores = match config.provider {
            DatabaseProvider::Postgres => {
                let pool = DatabasePool::connect(config).await?;
                run_migrations(pool.pool()).await?;
                Self::postgres(pool)
            }
            DatabaseProvider::Memory => {
                warn!("Using the in-memory store; sessions and accounts are lost on restart");
                Self::memory(MemoryStore::new())
            }
        };

        for seed in &config.seed_accounts {
            let role: UserRole = seed.role.parse()?;
            let user = stores.directory.ensure_account(seed.username.trim(), role).await?;
            info!(username = %user.username, role = %user.role, "Seed account ready");
        }

        Ok(stores)
    }

    /// Check the backend is reachable.
    pub async fn health_check(&self) -> AppResult<()> {
        match &self.pool {
            Some(pool) => pool.health_check().await,
            None => Ok(()),
        }
    }

    /// Release backend resources.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
