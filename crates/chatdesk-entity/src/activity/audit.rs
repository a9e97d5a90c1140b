//! Administrator audit entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chatdesk_core::types::{ActivityId, UserId};

/// An immutable record of an administrative action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Record id.
    pub id: ActivityId,
    /// The administrator who acted.
    pub actor_id: UserId,
    /// IP address of the administrator's request.
    pub actor_ip: Option<String>,
    /// The action performed (e.g. `"user.force_logout"`, `"user.status"`).
    pub action: String,
    /// The affected account.
    pub target_id: Option<UserId>,
    /// Action-specific details.
    pub metadata: serde_json::Value,
    /// When it happened.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditEntry {
    /// The administrator who acted.
    pub actor_id: UserId,
    /// IP address of the administrator's request.
    pub actor_ip: Option<String>,
    /// The action performed.
    pub action: String,
    /// The affected account.
    pub target_id: Option<UserId>,
    /// Action-specific details.
    pub metadata: serde_json::Value,
}

impl CreateAuditEntry {
    /// Materialize into a stored entry stamped now.
    pub fn into_entry(self) -> AuditEntry {
        AuditEntry {
            id: ActivityId::new(),
            actor_id: self.actor_id,
            actor_ip: self.actor_ip,
            action: self.action,
            target_id: self.target_id,
            metadata: self.metadata,
            created_at: Utc::now(),
        }
    }
}
