//! Notices delivered on an account's private channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Type-specific part of a [`UserEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserEventKind {
    /// The connection is about to be closed by an administrator.
    ForceLogout {
        /// Reason shown to the user.
        reason: String,
    },
}

/// A notice sent to one account's live connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEvent {
    /// Event type and its specific fields.
    #[serde(flatten)]
    pub kind: UserEventKind,
    /// When the notice was emitted.
    pub at: DateTime<Utc>,
}

impl UserEvent {
    /// `FORCE_LOGOUT`
    pub fn force_logout(reason: impl Into<String>) -> Self {
        Self {
            kind: UserEventKind::ForceLogout {
                reason: reason.into(),
            },
            at: Utc::now(),
        }
    }
}
