//! JWT claims structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chatdesk_core::types::{SessionKey, UserId};
use chatdesk_entity::user::UserRole;

/// Claims embedded in every bearer credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID.
    pub sub: UserId,
    /// Role at issue time.
    pub role: UserRole,
    /// Username at issue time.
    pub username: String,
    /// The session this credential belongs to.
    pub sid: SessionKey,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiration (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Returns the user ID from the subject claim.
    pub fn user_id(&self) -> UserId {
        self.sub
    }

    /// Whether the credential was issued for an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Returns the issue time as a `DateTime<Utc>`.
    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }
}
