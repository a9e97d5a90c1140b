//! Individual WebSocket connection handle.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use chatdesk_core::types::{ConnectionId, SessionKey, UserId};
use chatdesk_entity::user::UserRole;

use super::authenticator::ConnectionIdentity;

/// A handle to a single WebSocket connection.
///
/// Holds the outbound sender and a cancellation token. Cancelling the
/// token asks the socket task to flush and close; the task then
/// unregisters the connection itself.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// User who owns this connection
    pub user_id: UserId,
    /// Session the connection authenticated with
    pub session_id: SessionKey,
    /// User's role (cached for quick checks)
    pub role: UserRole,
    /// Username (cached for display)
    pub username: String,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<String>,
    cancel: CancellationToken,
}

impl ConnectionHandle {
    /// Create a new connection handle
    pub fn new(identity: ConnectionIdentity, sender: mpsc::Sender<String>) -> Self {
        Self {
            id: ConnectionId::new(),
            user_id: identity.user_id,
            session_id: identity.session_id,
            role: identity.role,
            username: identity.username,
            connected_at: Utc::now(),
            sender,
            cancel: CancellationToken::new(),
        }
    }

    /// Queue a text frame. Returns `false` if the connection is closing or
    /// its buffer is full.
    pub fn send(&self, text: String) -> bool {
        if self.is_closed() {
            return false;
        }
        match self.sender.try_send(text) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Send buffer full, dropping frame");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.close();
                false
            }
        }
    }

    /// Ask the socket task to close this connection.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Whether close has been requested.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token the socket task waits on.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether this connection belongs to an administrator.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
