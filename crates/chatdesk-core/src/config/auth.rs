//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Credential signing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    ///
    /// Left unset, the server still starts but every endpoint that issues or
    /// verifies a credential answers with a configuration error.
    #[serde(default)]
    pub jwt_secret: Option<String>,
    /// Credential lifetime in hours.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_hours: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_hours: default_token_ttl(),
        }
    }
}

impl AuthConfig {
    /// Returns the signing secret if one is configured and non-empty.
    pub fn secret(&self) -> Option<&str> {
        self.jwt_secret.as_deref().filter(|s| !s.trim().is_empty())
    }
}

fn default_token_ttl() -> u64 {
    24
}
