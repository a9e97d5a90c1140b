//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use chatdesk_core::config::{RealtimeConfig, SessionConfig};
use chatdesk_core::traits::PresenceView;
use chatdesk_core::types::ConnectionId;
use chatdesk_database::Stores;

use crate::connection::authenticator::ConnectionIdentity;
use crate::connection::handle::ConnectionHandle;
use crate::connection::manager::ConnectionManager;
use crate::fanout::EventFanout;
use crate::message::types::OutboundFrame;
use crate::presence::coordinator::PresenceCoordinator;
use crate::session_control::SessionControl;

/// Central real-time engine. Socket tasks call [`connect`](Self::connect)
/// and [`disconnect`](Self::disconnect); the engine keeps the connection
/// manager and the presence coordinator in step.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection manager.
    pub connections: Arc<ConnectionManager>,
    /// Presence coordinator.
    pub presence: Arc<PresenceCoordinator>,
    /// Admin and per-user event fan-out.
    pub fanout: Arc<EventFanout>,
    /// Forced logout.
    pub control: Arc<SessionControl>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("connections", &self.connections.connection_count())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine with all subsystems.
    pub fn new(config: RealtimeConfig, session: SessionConfig, stores: &Stores) -> Self {
        let connections = Arc::new(ConnectionManager::new(config));
        let fanout = Arc::new(EventFanout::new(connections.clone()));
        let presence = Arc::new(PresenceCoordinator::new(stores, fanout.clone(), session));
        let control = Arc::new(SessionControl::new(
            connections.clone(),
            fanout.clone(),
            stores,
        ));

        info!("Real-time engine initialized");

        Self {
            connections,
            presence,
            fanout,
            control,
        }
    }

    /// Register an authenticated connection. Admins get a presence
    /// snapshot before any live event.
    pub fn connect(
        &self,
        identity: ConnectionIdentity,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (handle, rx) = self.connections.register(identity.clone());
        if handle.is_admin() {
            let snapshot = OutboundFrame::PresenceSnapshot(self.presence.online_users());
            self.connections.send_to(&handle, &snapshot);
        }
        self.presence.connection_opened(&identity);
        (handle, rx)
    }

    /// Unregister a connection. Safe to call more than once; only the first
    /// call counts towards presence.
    pub fn disconnect(&self, conn_id: &ConnectionId) {
        if let Some(handle) = self.connections.unregister(conn_id) {
            self.presence
                .connection_closed(handle.user_id, handle.session_id.clone());
        }
    }

    /// Ask every connection to close. Pending offline timers are abandoned
    /// with the runtime.
    pub fn shutdown(&self) {
        info!("Shutting down real-time engine");
        self.connections.close_all();
    }
}
