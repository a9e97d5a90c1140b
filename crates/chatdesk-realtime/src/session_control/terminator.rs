//! Forced logout: notify, disconnect, then clear the ledger in the background.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use chatdesk_core::events::{AdminEvent, LogoutReason, UserEvent};
use chatdesk_core::task::spawn_detached;
use chatdesk_core::traits::AdminEventSink;
use chatdesk_core::types::UserId;
use chatdesk_database::{ActivityLog, SessionLedger, Stores};
use chatdesk_entity::activity::LogoutEvent;

use crate::connection::manager::ConnectionManager;
use crate::fanout::EventFanout;

/// Kicks accounts off the service.
#[derive(Clone)]
pub struct SessionControl {
    connections: Arc<ConnectionManager>,
    fanout: Arc<EventFanout>,
    ledger: Arc<dyn SessionLedger>,
    activity: Arc<dyn ActivityLog>,
}

impl std::fmt::Debug for SessionControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionControl").finish_non_exhaustive()
    }
}

impl SessionControl {
    /// Creates a new session control.
    pub fn new(connections: Arc<ConnectionManager>, fanout: Arc<EventFanout>, stores: &Stores) -> Self {
        Self {
            connections,
            fanout,
            ledger: Arc::clone(&stores.ledger),
            activity: Arc::clone(&stores.activity),
        }
    }

    /// Send the account a `FORCE_LOGOUT` notice and close its connections.
    /// The ledger clear, the `forced` logout record and the admin event
    /// follow on a detached task, after the connections are closed.
    ///
    /// Returns how many connections were asked to close.
    pub fn force_logout(&self, user_id: UserId, reason: &str) -> usize {
        self.fanout
            .emit_user_event(&user_id, UserEvent::force_logout(reason));
        let closed = self.connections.close_user(&user_id);
        info!(user_id = %user_id, reason, closed, "Forcing logout");

        let ledger = Arc::clone(&self.ledger);
        let activity = Arc::clone(&self.activity);
        let fanout = Arc::clone(&self.fanout);
        let reason = reason.to_string();
        spawn_detached("force_logout", async move {
            let held = ledger.force_release(&user_id, Utc::now()).await?;
            fanout.publish(AdminEvent::force_logout(user_id, reason));
            if held {
                activity
                    .record_logout(LogoutEvent::new(user_id, LogoutReason::Forced))
                    .await?;
            }
            Ok(())
        });

        closed
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;

    use chatdesk_core::config::RealtimeConfig;
    use chatdesk_core::types::{BootEpoch, SessionKey};
    use chatdesk_database::{AccountDirectory, MemoryStore};
    use chatdesk_entity::session::SessionGrant;
    use chatdesk_entity::user::UserRole;

    use crate::connection::authenticator::ConnectionIdentity;

    use super::*;

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_disconnects_before_ledger_clear() {
        let store = MemoryStore::new();
        let user = store.ensure_account("bob", UserRole::User).await.unwrap();
        let admin = store.ensure_account("root", UserRole::Admin).await.unwrap();
        let grant = SessionGrant {
            session_id: SessionKey::new("s1"),
            boot: BootEpoch::capture(),
            issued_at: Utc::now(),
        };
        store
            .try_acquire_session(&user.id, &grant, Utc::now() - ChronoDuration::hours(12))
            .await
            .unwrap();

        let stores = Stores::memory(store.clone());
        let connections = Arc::new(ConnectionManager::new(RealtimeConfig::default()));
        let fanout = Arc::new(EventFanout::new(connections.clone()));
        let control = SessionControl::new(connections.clone(), fanout, &stores);

        let (handle, mut user_rx) = connections.register(ConnectionIdentity {
            user_id: user.id,
            session_id: grant.session_id.clone(),
            role: UserRole::User,
            username: "bob".into(),
        });
        let (_admin_handle, mut admin_rx) = connections.register(ConnectionIdentity {
            user_id: admin.id,
            session_id: SessionKey::new("a1"),
            role: UserRole::Admin,
            username: "root".into(),
        });
        assert_eq!(control.force_logout(user.id, "kicked"), 1);

        // Connection closed synchronously; the ledger is still held until the
        // detached task runs.
        assert!(handle.is_closed());
        let notice = user_rx.try_recv().unwrap();
        assert!(notice.contains("user:event"));
        assert!(notice.contains("FORCE_LOGOUT"));
        assert!(store.find_active_session(&user.id).await.unwrap().is_some());

        settle().await;

        assert!(store.find_active_session(&user.id).await.unwrap().is_none());
        assert!(store.last_logout_at(&user.id).await.unwrap().is_some());
        let logouts = store.logouts().await;
        assert_eq!(logouts.len(), 1);
        assert_eq!(logouts[0].reason, LogoutReason::Forced);

        let admin_frame = admin_rx.recv().await.unwrap();
        assert!(admin_frame.contains("FORCE_LOGOUT"));
        assert!(admin_frame.contains("kicked"));
    }

    #[tokio::test]
    async fn test_no_session_records_no_logout() {
        let store = MemoryStore::new();
        let user = store.ensure_account("carol", UserRole::User).await.unwrap();
        let stores = Stores::memory(store.clone());
        let connections = Arc::new(ConnectionManager::new(RealtimeConfig::default()));
        let fanout = Arc::new(EventFanout::new(connections.clone()));
        let control = SessionControl::new(connections, fanout, &stores);

        assert_eq!(control.force_logout(user.id, "disabled"), 0);
        settle().await;
        assert!(store.logouts().await.is_empty());
    }
}
