//! Collaborator traits for the session subsystem.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use chatdesk_core::result::AppResult;
use chatdesk_core::types::{SessionKey, UserId};
use chatdesk_entity::activity::{CreateAuditEntry, LoginEvent, LogoutEvent};
use chatdesk_entity::session::{ActiveSession, SessionGrant};
use chatdesk_entity::user::{User, UserRole};

/// Result of [`SessionLedger::try_acquire_session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// The grant was written.
    Acquired,
    /// A current, non-stale session is held by someone else.
    Held(ActiveSession),
    /// The account is missing or disabled.
    Ineligible,
}

/// Result of [`SessionLedger::release_session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// A matching session was cleared.
    Cleared,
    /// Nothing matched; the ledger is unchanged.
    Noop,
}

impl ReleaseOutcome {
    /// Whether the release took effect.
    pub fn cleared(&self) -> bool {
        matches!(self, Self::Cleared)
    }
}

/// Durable record of the single session each account holds.
///
/// Every mutating operation must be one atomic conditional write; the
/// login path relies on that alone for mutual exclusion.
#[async_trait]
pub trait SessionLedger: Send + Sync + 'static {
    /// The session currently recorded for the account.
    async fn find_active_session(&self, user_id: &UserId) -> AppResult<Option<ActiveSession>>;

    /// Write `grant` if the account is active and holds no session, or
    /// its session came from another boot epoch, or was created before
    /// `stale_before`. Stamps `last_login_at` on success.
    async fn try_acquire_session(
        &self,
        user_id: &UserId,
        grant: &SessionGrant,
        stale_before: DateTime<Utc>,
    ) -> AppResult<AcquireOutcome>;

    /// Replace `expected_previous` with `grant`. Returns `false` if the
    /// ledger no longer holds `expected_previous`.
    async fn replace_session(
        &self,
        user_id: &UserId,
        expected_previous: &SessionKey,
        grant: &SessionGrant,
    ) -> AppResult<bool>;

    /// Clear the session, stamping `last_logout_at`, if one is held and it
    /// matches `expected` (any session when `expected` is `None`).
    async fn release_session(
        &self,
        user_id: &UserId,
        expected: Option<&SessionKey>,
        now: DateTime<Utc>,
    ) -> AppResult<ReleaseOutcome>;

    /// Clear whatever session is held and stamp `last_logout_at`.
    /// Returns whether a session was present.
    async fn force_release(&self, user_id: &UserId, now: DateTime<Utc>) -> AppResult<bool>;

    /// When the account's session was last cleared.
    async fn last_logout_at(&self, user_id: &UserId) -> AppResult<Option<DateTime<Utc>>>;
}

/// Account lookups and the admin status toggle.
#[async_trait]
pub trait AccountDirectory: Send + Sync + 'static {
    /// Case-insensitive exact username match.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Lookup by id.
    async fn find_by_id(&self, user_id: &UserId) -> AppResult<Option<User>>;

    /// Set `is_active`, returning the previous value, or `None` if the
    /// account does not exist.
    async fn set_active(&self, user_id: &UserId, active: bool) -> AppResult<Option<bool>>;

    /// Create the account unless one with the same username exists.
    /// Returns the stored account either way.
    async fn ensure_account(&self, username: &str, role: UserRole) -> AppResult<User>;
}

/// Append-only activity records.
#[async_trait]
pub trait ActivityLog: Send + Sync + 'static {
    /// Record a granted session.
    async fn record_login(&self, event: LoginEvent) -> AppResult<()>;

    /// Record an ended session.
    async fn record_logout(&self, event: LogoutEvent) -> AppResult<()>;

    /// Record an administrator action.
    async fn record_audit(&self, entry: CreateAuditEntry) -> AppResult<()>;
}
