//! Persistence configuration.

use serde::{Deserialize, Serialize};

/// Which backing store holds accounts, session ledger and activity records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseProvider {
    /// PostgreSQL via sqlx.
    #[default]
    Postgres,
    /// Process-local store; single node only, lost on restart.
    Memory,
}

/// Database connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Backing store.
    #[serde(default)]
    pub provider: DatabaseProvider,
    /// PostgreSQL connection URL.
    #[serde(default)]
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connection timeout in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// Accounts ensured at startup (created if missing) for either provider.
    #[serde(default)]
    pub seed_accounts: Vec<SeedAccount>,
}

/// An account to create when the store starts empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedAccount {
    /// Login name.
    pub username: String,
    /// `"admin"` or `"user"`.
    #[serde(default = "default_seed_role")]
    pub role: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            provider: DatabaseProvider::default(),
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_seconds: default_connect_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
            seed_accounts: Vec::new(),
        }
    }
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}

fn default_seed_role() -> String {
    "user".to_string()
}
