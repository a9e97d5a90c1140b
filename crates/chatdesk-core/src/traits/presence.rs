//! Read-only view of live presence.

use crate::types::UserId;

/// Answers liveness questions from the process-local connection registry.
///
/// Implementations must be cheap and non-blocking; the login path calls
/// this while deciding whether to reject or take over a session.
pub trait PresenceView: Send + Sync + 'static {
    /// Whether the account has at least one live connection.
    fn is_online(&self, user_id: &UserId) -> bool;

    /// Accounts with at least one live connection.
    fn online_users(&self) -> Vec<UserId>;
}
