//! Presence coordinator: per-user live connection counts and the offline
//! debounce.
//!
//! A user goes online on their first connection and offline only after the
//! last one has stayed closed for the debounce window. Each armed timer
//! carries a generation number; a timer whose generation no longer matches
//! the user's pending one does nothing when it fires.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use dashmap::DashMap;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use chatdesk_core::config::SessionConfig;
use chatdesk_core::events::{AdminEvent, LogoutReason};
use chatdesk_core::result::AppResult;
use chatdesk_core::task::spawn_detached;
use chatdesk_core::traits::{AdminEventSink, PresenceView};
use chatdesk_core::types::{SessionKey, UserId};
use chatdesk_database::{ActivityLog, SessionLedger, Stores};
use chatdesk_entity::activity::LogoutEvent;

use crate::connection::authenticator::ConnectionIdentity;

#[derive(Debug)]
struct PendingOffline {
    generation: u64,
    timer: AbortHandle,
}

#[derive(Debug)]
struct UserPresence {
    count: usize,
    pending: Option<PendingOffline>,
    username: String,
}

/// Owns the connection registry. All updates go through
/// [`connection_opened`](Self::connection_opened) and
/// [`connection_closed`](Self::connection_closed).
pub struct PresenceCoordinator {
    entries: DashMap<UserId, UserPresence>,
    generation: AtomicU64,
    ledger: Arc<dyn SessionLedger>,
    activity: Arc<dyn ActivityLog>,
    events: Arc<dyn AdminEventSink>,
    config: SessionConfig,
}

impl std::fmt::Debug for PresenceCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceCoordinator")
            .field("tracked_users", &self.entries.len())
            .field("config", &self.config)
            .finish()
    }
}

impl PresenceCoordinator {
    /// Creates a coordinator with an empty registry.
    pub fn new(stores: &Stores, events: Arc<dyn AdminEventSink>, config: SessionConfig) -> Self {
        Self {
            entries: DashMap::new(),
            generation: AtomicU64::new(0),
            ledger: Arc::clone(&stores.ledger),
            activity: Arc::clone(&stores.activity),
            events,
            config,
        }
    }

    /// Count a new live connection. Cancels a pending offline timer and
    /// emits `PRESENCE online` on every 0→1 transition, including one that
    /// resumes within the debounce window.
    pub fn connection_opened(&self, identity: &ConnectionIdentity) {
        let user_id = identity.user_id;
        let (came_online, resumed) = {
            let mut entry = self.entries.entry(user_id).or_insert_with(|| UserPresence {
                count: 0,
                pending: None,
                username: identity.username.clone(),
            });
            let resumed = match entry.pending.take() {
                Some(pending) => {
                    pending.timer.abort();
                    true
                }
                None => false,
            };
            entry.count += 1;
            entry.username.clone_from(&identity.username);
            (entry.count == 1, resumed)
        };

        if came_online {
            info!(user_id = %user_id, resumed, "User online");
            self.events.publish(
                AdminEvent::presence(user_id, true).with_username(identity.username.clone()),
            );
        } else {
            debug!(user_id = %user_id, "Additional connection");
        }
    }

    /// Count a closed connection. At zero, arm the offline timer for the
    /// session the connection authenticated with.
    pub fn connection_closed(self: &Arc<Self>, user_id: UserId, session_id: SessionKey) {
        let Some(mut entry) = self.entries.get_mut(&user_id) else {
            warn!(user_id = %user_id, "Close for untracked user");
            return;
        };
        entry.count = entry.count.saturating_sub(1);
        if entry.count > 0 {
            return;
        }

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let delay = self.config.offline_debounce();
        let this = Arc::clone(self);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            this.confirm_offline(user_id, generation, session_id);
        });

        if let Some(stale) = entry.pending.replace(PendingOffline {
            generation,
            timer: task.abort_handle(),
        }) {
            stale.timer.abort();
        }
    }

    fn confirm_offline(&self, user_id: UserId, generation: u64, session_id: SessionKey) {
        let removed = self.entries.remove_if(&user_id, |_, entry| {
            entry.count == 0
                && entry
                    .pending
                    .as_ref()
                    .is_some_and(|p| p.generation == generation)
        });
        let Some((_, entry)) = removed else {
            return;
        };

        info!(user_id = %user_id, "User offline");
        self.events.publish(
            AdminEvent::presence(user_id, false).with_username(entry.username.clone()),
        );

        let ledger = Arc::clone(&self.ledger);
        let activity = Arc::clone(&self.activity);
        let events = Arc::clone(&self.events);
        let dedup = self.config.logout_dedup_window();
        spawn_detached("presence_write_back", async move {
            release_after_disconnect(
                ledger.as_ref(),
                activity.as_ref(),
                events.as_ref(),
                user_id,
                entry.username,
                session_id,
                dedup,
            )
            .await
        });
    }
}

/// Best-effort logout for a user confirmed offline. Skipped if a logout
/// was recorded within `dedup`; conditioned on the session the last
/// connection held so a newer login is never cleared.
async fn release_after_disconnect(
    ledger: &dyn SessionLedger,
    activity: &dyn ActivityLog,
    events: &dyn AdminEventSink,
    user_id: UserId,
    username: String,
    session_id: SessionKey,
    dedup: chrono::Duration,
) -> AppResult<()> {
    let now = Utc::now();
    if let Some(last) = ledger.last_logout_at(&user_id).await? {
        if now - last < dedup {
            debug!(user_id = %user_id, "Recent logout on record, skipping disconnect logout");
            return Ok(());
        }
    }

    let outcome = ledger
        .release_session(&user_id, Some(&session_id), now)
        .await?;
    if !outcome.cleared() {
        return Ok(());
    }

    info!(user_id = %user_id, "Session released after disconnect");
    events.publish(AdminEvent::logout(user_id, LogoutReason::Disconnect).with_username(username));
    activity
        .record_logout(LogoutEvent::new(user_id, LogoutReason::Disconnect))
        .await
}

impl PresenceView for PresenceCoordinator {
    fn is_online(&self, user_id: &UserId) -> bool {
        self.entries.get(user_id).is_some_and(|e| e.count > 0)
    }

    fn online_users(&self) -> Vec<UserId> {
        self.entries
            .iter()
            .filter(|e| e.count > 0)
            .map(|e| *e.key())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use chrono::Duration as ChronoDuration;

    use chatdesk_core::events::AdminEventKind;
    use chatdesk_core::types::BootEpoch;
    use chatdesk_database::{AccountDirectory, MemoryStore};
    use chatdesk_entity::session::SessionGrant;
    use chatdesk_entity::user::UserRole;

    use super::*;

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<AdminEvent>>);

    impl RecordingSink {
        fn kinds(&self) -> Vec<AdminEventKind> {
            self.0.lock().unwrap().iter().map(|e| e.kind.clone()).collect()
        }
    }

    impl AdminEventSink for RecordingSink {
        fn publish(&self, event: AdminEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    struct Harness {
        coordinator: Arc<PresenceCoordinator>,
        store: MemoryStore,
        sink: Arc<RecordingSink>,
        identity: ConnectionIdentity,
    }

    async fn harness() -> Harness {
        let store = MemoryStore::new();
        let user = store.ensure_account("alice", UserRole::User).await.unwrap();
        let grant = SessionGrant {
            session_id: SessionKey::new("live"),
            boot: BootEpoch::capture(),
            issued_at: Utc::now(),
        };
        store
            .try_acquire_session(&user.id, &grant, Utc::now() - ChronoDuration::hours(12))
            .await
            .unwrap();

        let sink = Arc::new(RecordingSink::default());
        let coordinator = Arc::new(PresenceCoordinator::new(
            &Stores::memory(store.clone()),
            sink.clone(),
            SessionConfig::default(),
        ));
        let identity = ConnectionIdentity {
            user_id: user.id,
            session_id: grant.session_id,
            role: UserRole::User,
            username: "alice".into(),
        };
        Harness {
            coordinator,
            store,
            sink,
            identity,
        }
    }

    impl Harness {
        fn close(&self) {
            self.coordinator
                .connection_closed(self.identity.user_id, self.identity.session_id.clone());
        }
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_within_window_skips_offline() {
        let h = harness().await;
        h.coordinator.connection_opened(&h.identity);
        h.close();
        tokio::time::sleep(Duration::from_millis(500)).await;
        h.coordinator.connection_opened(&h.identity);
        tokio::time::sleep(Duration::from_secs(5)).await;
        settle().await;

        // Online again on resume; never offline, never a logout.
        assert_eq!(
            h.sink.kinds(),
            vec![
                AdminEventKind::Presence { online: true },
                AdminEventKind::Presence { online: true },
            ]
        );
        assert!(h.coordinator.is_online(&h.identity.user_id));
        assert!(h.store.find_active_session(&h.identity.user_id).await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_close_goes_offline_once() {
        let h = harness().await;
        h.coordinator.connection_opened(&h.identity);
        h.coordinator.connection_opened(&h.identity);
        h.close();
        assert!(h.coordinator.is_online(&h.identity.user_id));
        h.close();
        assert!(!h.coordinator.is_online(&h.identity.user_id));

        tokio::time::sleep(Duration::from_millis(900)).await;
        settle().await;

        assert_eq!(
            h.sink.kinds(),
            vec![
                AdminEventKind::Presence { online: true },
                AdminEventKind::Presence { online: false },
                AdminEventKind::Logout {
                    reason: LogoutReason::Disconnect
                },
            ]
        );
        assert!(h.store.find_active_session(&h.identity.user_id).await.unwrap().is_none());
        assert_eq!(h.store.logouts().await.len(), 1);
        assert!(h.coordinator.online_users().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_offline_before_debounce() {
        let h = harness().await;
        h.coordinator.connection_opened(&h.identity);
        h.close();
        tokio::time::sleep(Duration::from_millis(700)).await;
        settle().await;
        assert_eq!(h.sink.kinds().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recent_logout_suppresses_release() {
        let h = harness().await;
        h.coordinator.connection_opened(&h.identity);
        // Explicit logout just happened and the user logged straight back in.
        h.store
            .release_session(&h.identity.user_id, None, Utc::now())
            .await
            .unwrap();
        let regrant = SessionGrant {
            session_id: h.identity.session_id.clone(),
            boot: BootEpoch::capture(),
            issued_at: Utc::now(),
        };
        h.store
            .try_acquire_session(&h.identity.user_id, &regrant, Utc::now() - ChronoDuration::hours(12))
            .await
            .unwrap();

        h.close();
        tokio::time::sleep(Duration::from_secs(1)).await;
        settle().await;

        assert_eq!(
            h.sink.kinds(),
            vec![
                AdminEventKind::Presence { online: true },
                AdminEventKind::Presence { online: false },
            ]
        );
        assert!(h.store.find_active_session(&h.identity.user_id).await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_session_is_not_released() {
        let h = harness().await;
        h.coordinator.connection_opened(&h.identity);
        let newer = SessionGrant {
            session_id: SessionKey::new("newer"),
            boot: BootEpoch::capture(),
            issued_at: Utc::now(),
        };
        assert!(
            h.store
                .replace_session(&h.identity.user_id, &h.identity.session_id, &newer)
                .await
                .unwrap()
        );

        h.close();
        tokio::time::sleep(Duration::from_secs(1)).await;
        settle().await;

        let held = h.store.find_active_session(&h.identity.user_id).await.unwrap().unwrap();
        assert_eq!(held.session_id.as_str(), "newer");
        assert!(!h.sink.kinds().iter().any(|k| matches!(k, AdminEventKind::Logout { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearmed_timer_supersedes_previous() {
        let h = harness().await;
        h.coordinator.connection_opened(&h.identity);
        h.close();
        tokio::time::sleep(Duration::from_millis(400)).await;
        h.coordinator.connection_opened(&h.identity);
        h.close();
        tokio::time::sleep(Duration::from_millis(500)).await;
        settle().await;
        // First timer would have fired at 800ms; it was cancelled.
        assert_eq!(h.sink.kinds().len(), 2);

        tokio::time::sleep(Duration::from_millis(400)).await;
        settle().await;
        let offline = h
            .sink
            .kinds()
            .into_iter()
            .filter(|k| *k == AdminEventKind::Presence { online: false })
            .count();
        assert_eq!(offline, 1);
    }
}
