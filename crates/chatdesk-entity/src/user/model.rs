//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use chatdesk_core::types::{BootEpoch, SessionKey, UserId};

use super::role::UserRole;
use crate::session::ActiveSession;

/// A chat account together with its single-session lock columns.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Login name, unique case-insensitively.
    pub username: String,
    /// Account role.
    pub role: UserRole,
    /// Whether the account may hold a session at all.
    pub is_active: bool,
    /// Last successful login.
    pub last_login_at: Option<DateTime<Utc>>,
    /// Last time a session was cleared by logout, disconnect or kick.
    pub last_logout_at: Option<DateTime<Utc>>,

    // -- Single-session lock --
    /// Id of the held session, if any.
    #[serde(skip_serializing)]
    pub session_id: Option<String>,
    /// Boot epoch of the process that issued the held session.
    #[serde(skip_serializing)]
    pub session_boot_sec: Option<i64>,
    /// When the held session was issued.
    #[serde(skip_serializing)]
    pub session_created_at: Option<DateTime<Utc>>,

    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh account with no session.
    pub fn new(username: impl Into<String>, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            username: username.into(),
            role,
            is_active: true,
            last_login_at: None,
            last_logout_at: None,
            session_id: None,
            session_boot_sec: None,
            session_created_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// The held session, if all three lock columns are present.
    pub fn active_session(&self) -> Option<ActiveSession> {
        match (&self.session_id, self.session_boot_sec, self.session_created_at) {
            (Some(sid), Some(boot), Some(created_at)) => Some(ActiveSession {
                session_id: SessionKey::new(sid.clone()),
                boot: BootEpoch::from_secs(boot),
                created_at,
            }),
            _ => None,
        }
    }

    /// Clear the three lock columns together.
    pub fn clear_session(&mut self) {
        self.session_id = None;
        self.session_boot_sec = None;
        self.session_created_at = None;
    }
}
