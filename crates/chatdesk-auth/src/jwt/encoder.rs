//! Credential issue.

use chrono::Duration;
use jsonwebtoken::{EncodingKey, Header, encode};

use chatdesk_core::config::AuthConfig;
use chatdesk_core::error::{AppError, ErrorKind};
use chatdesk_core::result::AppResult;
use chatdesk_entity::session::SessionGrant;
use chatdesk_entity::user::User;

use super::claims::Claims;

/// Signs HS256 credentials. Without a configured secret every call fails
/// with a configuration error.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: Option<EncodingKey>,
    ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("configured", &self.encoding_key.is_some())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: config.secret().map(|s| EncodingKey::from_secret(s.as_bytes())),
            ttl: Duration::hours(config.token_ttl_hours as i64),
        }
    }

    /// Whether a signing secret is configured.
    pub fn is_configured(&self) -> bool {
        self.encoding_key.is_some()
    }

    /// Issue a credential for `user` holding `grant`. `iat` is the grant's
    /// issue time.
    pub fn issue(&self, user: &User, grant: &SessionGrant) -> AppResult<String> {
        let key = self
            .encoding_key
            .as_ref()
            .ok_or_else(|| AppError::configuration("JWT secret is not configured"))?;

        let claims = Claims {
            sub: user.id,
            role: user.role,
            username: user.username.clone(),
            sid: grant.session_id.clone(),
            iat: grant.issued_at.timestamp(),
            exp: (grant.issued_at + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, key).map_err(|e| {
            AppError::with_source(ErrorKind::Internal, format!("Failed to sign credential: {e}"), e)
        })
    }
}
