//! Logout activity record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chatdesk_core::events::LogoutReason;
use chatdesk_core::types::{ActivityId, UserId};

/// One ended session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutEvent {
    /// Record id.
    pub id: ActivityId,
    /// The account whose session ended.
    pub user_id: UserId,
    /// What ended it.
    pub reason: LogoutReason,
    /// When it happened.
    pub created_at: DateTime<Utc>,
}

impl LogoutEvent {
    /// Build a record stamped now.
    pub fn new(user_id: UserId, reason: LogoutReason) -> Self {
        Self {
            id: ActivityId::new(),
            user_id,
            reason,
            created_at: Utc::now(),
        }
    }
}
