//! Application configuration schemas.
//!
//! Deserialized from TOML files via the `config` crate. Each sub-module
//! represents a logical configuration section.

pub mod admin;
pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod realtime;
pub mod session;

use serde::{Deserialize, Serialize};

pub use self::admin::AdminConfig;
pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::database::{DatabaseConfig, DatabaseProvider, SeedAccount};
pub use self::logging::LoggingConfig;
pub use self::realtime::RealtimeConfig;
pub use self::session::SessionConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// Top-level deserialization target for the merged configuration
/// (default.toml + environment overlay + `CHATDESK__*` variables).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Persistence settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Credential settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Admin surface restrictions.
    #[serde(default)]
    pub admin: AdminConfig,
    /// Session lock and presence timing.
    #[serde(default)]
    pub session: SessionConfig,
    /// Real-time WebSocket settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Merges `config/default.toml`, the `config/{env}.toml` overlay and
    /// environment variables prefixed with `CHATDESK__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CHATDESK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let app: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        app.validate()?;
        Ok(app)
    }

    /// Cross-field checks that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        self.session.validate()
    }
}
