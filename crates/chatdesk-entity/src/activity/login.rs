//! Login activity record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chatdesk_core::types::{ActivityId, UserId};

/// One granted session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginEvent {
    /// Record id.
    pub id: ActivityId,
    /// The account that logged in.
    pub user_id: UserId,
    /// Client IP of the login request.
    pub ip: Option<String>,
    /// Whether the login replaced an abandoned session.
    pub takeover: bool,
    /// When it happened.
    pub created_at: DateTime<Utc>,
}

impl LoginEvent {
    /// Build a record stamped now.
    pub fn new(user_id: UserId, ip: Option<String>, takeover: bool) -> Self {
        Self {
            id: ActivityId::new(),
            user_id,
            ip,
            takeover,
            created_at: Utc::now(),
        }
    }
}
