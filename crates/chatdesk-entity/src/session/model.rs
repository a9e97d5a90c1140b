//! The session an account currently holds, and the one being requested.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chatdesk_core::types::{BootEpoch, SessionKey};

/// The session recorded in the ledger for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSession {
    /// Session id embedded in the holder's credential.
    pub session_id: SessionKey,
    /// Epoch of the process that issued it.
    pub boot: BootEpoch,
    /// When it was issued.
    pub created_at: DateTime<Utc>,
}

impl ActiveSession {
    /// Whether a new login may replace this session without asking
    /// anyone: it was issued by an earlier process run, or before
    /// `stale_before`.
    pub fn is_acquirable(&self, current: BootEpoch, stale_before: DateTime<Utc>) -> bool {
        self.boot != current || self.created_at < stale_before
    }
}

/// A session about to be written to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionGrant {
    /// Freshly generated session id.
    pub session_id: SessionKey,
    /// Current process epoch.
    pub boot: BootEpoch,
    /// Issue time; also stamped as `last_login_at`.
    pub issued_at: DateTime<Utc>,
}
