//! In-memory store behind a single Tokio mutex, for tests and single-node
//! development. Every operation takes the lock once, so each conditional
//! write is atomic with respect to the others.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use chatdesk_core::result::AppResult;
use chatdesk_core::types::{SessionKey, UserId};
use chatdesk_entity::activity::{AuditEntry, CreateAuditEntry, LoginEvent, LogoutEvent};
use chatdesk_entity::session::{ActiveSession, SessionGrant};
use chatdesk_entity::user::{User, UserRole};

use super::traits::{AccountDirectory, AcquireOutcome, ActivityLog, ReleaseOutcome, SessionLedger};

#[derive(Debug, Default)]
struct InnerState {
    users: HashMap<UserId, User>,
    logins: Vec<LoginEvent>,
    logouts: Vec<LogoutEvent>,
    audit: Vec<AuditEntry>,
}

impl InnerState {
    fn write_grant(user: &mut User, grant: &SessionGrant) {
        user.session_id = Some(grant.session_id.as_str().to_string());
        user.session_boot_sec = Some(grant.boot.as_secs());
        user.session_created_at = Some(grant.issued_at);
        user.last_login_at = Some(grant.issued_at);
        user.updated_at = grant.issued_at;
    }

    fn clear(user: &mut User, now: DateTime<Utc>) {
        user.clear_session();
        user.last_logout_at = Some(now);
        user.updated_at = now;
    }
}

/// Memory-backed ledger, directory and activity log.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an account row.
    pub async fn insert_user(&self, user: User) {
        let mut state = self.state.lock().await;
        state.users.insert(user.id, user);
    }

    /// Snapshot of recorded logins.
    pub async fn logins(&self) -> Vec<LoginEvent> {
        self.state.lock().await.logins.clone()
    }

    /// Snapshot of recorded logouts.
    pub async fn logouts(&self) -> Vec<LogoutEvent> {
        self.state.lock().await.logouts.clone()
    }

    /// Snapshot of recorded audit entries.
    pub async fn audit_entries(&self) -> Vec<AuditEntry> {
        self.state.lock().await.audit.clone()
    }
}

#[async_trait]
impl SessionLedger for MemoryStore {
    async fn find_active_session(&self, user_id: &UserId) -> AppResult<Option<ActiveSession>> {
        let state = self.state.lock().await;
        Ok(state.users.get(user_id).and_then(User::active_session))
    }

    async fn try_acquire_session(
        &self,
        user_id: &UserId,
        grant: &SessionGrant,
        stale_before: DateTime<Utc>,
    ) -> AppResult<AcquireOutcome> {
        let mut state = self.state.lock().await;
        let Some(user) = state.users.get_mut(user_id).filter(|u| u.is_active) else {
            return Ok(AcquireOutcome::Ineligible);
        };

        if let Some(held) = user.active_session() {
            if !held.is_acquirable(grant.boot, stale_before) {
                return Ok(AcquireOutcome::Held(held));
            }
            debug!(user_id = %user_id, "Overwriting stale or previous-epoch session");
        }

        InnerState::write_grant(user, grant);
        Ok(AcquireOutcome::Acquired)
    }

    async fn replace_session(
        &self,
        user_id: &UserId,
        expected_previous: &SessionKey,
        grant: &SessionGrant,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let Some(user) = state.users.get_mut(user_id).filter(|u| u.is_active) else {
            return Ok(false);
        };
        if user.session_id.as_deref() != Some(expected_previous.as_str()) {
            return Ok(false);
        }
        InnerState::write_grant(user, grant);
        Ok(true)
    }

    async fn release_session(
        &self,
        user_id: &UserId,
        expected: Option<&SessionKey>,
        now: DateTime<Utc>,
    ) -> AppResult<ReleaseOutcome> {
        let mut state = self.state.lock().await;
        let Some(user) = state.users.get_mut(user_id) else {
            return Ok(ReleaseOutcome::Noop);
        };
        let matches = match (&user.session_id, expected) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(held), Some(expected)) => held == expected.as_str(),
        };
        if !matches {
            return Ok(ReleaseOutcome::Noop);
        }
        InnerState::clear(user, now);
        Ok(ReleaseOutcome::Cleared)
    }

    async fn force_release(&self, user_id: &UserId, now: DateTime<Utc>) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let Some(user) = state.users.get_mut(user_id) else {
            return Ok(false);
        };
        let held = user.session_id.is_some();
        InnerState::clear(user, now);
        Ok(held)
    }

    async fn last_logout_at(&self, user_id: &UserId) -> AppResult<Option<DateTime<Utc>>> {
        let state = self.state.lock().await;
        Ok(state.users.get(user_id).and_then(|u| u.last_logout_at))
    }
}

#[async_trait]
impl AccountDirectory for MemoryStore {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let needle = username.to_lowercase();
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|u| u.username.to_lowercase() == needle)
            .cloned())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AppResult<Option<User>> {
        Ok(self.state.lock().await.users.get(user_id).cloned())
    }

    async fn set_active(&self, user_id: &UserId, active: bool) -> AppResult<Option<bool>> {
        let mut state = self.state.lock().await;
        Ok(state.users.get_mut(user_id).map(|user| {
            let previous = user.is_active;
            user.is_active = active;
            user.updated_at = Utc::now();
            previous
        }))
    }

    async fn ensure_account(&self, username: &str, role: UserRole) -> AppResult<User> {
        let needle = username.to_lowercase();
        let mut state = self.state.lock().await;
        if let Some(existing) = state
            .users
            .values()
            .find(|u| u.username.to_lowercase() == needle)
        {
            return Ok(existing.clone());
        }
        let user = User::new(username, role);
        state.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl ActivityLog for MemoryStore {
    async fn record_login(&self, event: LoginEvent) -> AppResult<()> {
        self.state.lock().await.logins.push(event);
        Ok(())
    }

    async fn record_logout(&self, event: LogoutEvent) -> AppResult<()> {
        self.state.lock().await.logouts.push(event);
        Ok(())
    }

    async fn record_audit(&self, entry: CreateAuditEntry) -> AppResult<()> {
        self.state.lock().await.audit.push(entry.into_entry());
        Ok(())
    }
}
