//! WebSocket authentication: validates the bearer credential before upgrade.

use std::sync::Arc;

use chatdesk_auth::jwt::{Claims, JwtDecoder};
use chatdesk_core::result::AppResult;
use chatdesk_core::types::{SessionKey, UserId};
use chatdesk_entity::user::UserRole;

/// Who a live connection belongs to, taken from its credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionIdentity {
    /// User ID.
    pub user_id: UserId,
    /// Session the credential was issued for.
    pub session_id: SessionKey,
    /// User role.
    pub role: UserRole,
    /// Username.
    pub username: String,
}

impl From<Claims> for ConnectionIdentity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            session_id: claims.sid,
            role: claims.role,
            username: claims.username,
        }
    }
}

/// Authenticates WebSocket connections using bearer credentials.
#[derive(Clone)]
pub struct WsAuthenticator {
    decoder: Arc<JwtDecoder>,
}

impl std::fmt::Debug for WsAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsAuthenticator").finish()
    }
}

impl WsAuthenticator {
    /// Creates a new WebSocket authenticator.
    pub fn new(decoder: Arc<JwtDecoder>) -> Self {
        Self { decoder }
    }

    /// Verify `token`; credentials from a previous process run are refused.
    pub fn authenticate(&self, token: &str) -> AppResult<ConnectionIdentity> {
        self.decoder.authenticate(token).map(ConnectionIdentity::from)
    }
}
