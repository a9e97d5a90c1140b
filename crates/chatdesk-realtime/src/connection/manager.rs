//! Connection manager: registration, room membership and frame delivery.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info};

use chatdesk_core::config::RealtimeConfig;
use chatdesk_core::types::{ConnectionId, UserId};

use crate::message::types::OutboundFrame;
use crate::room::{ADMINS_ROOM, RoomRegistry, user_room};

use super::authenticator::ConnectionIdentity;
use super::handle::ConnectionHandle;
use super::pool::ConnectionPool;

/// Owns the connection pool and rooms. Presence is tracked separately by
/// the caller, from the values `register`/`unregister` return.
#[derive(Debug)]
pub struct ConnectionManager {
    pool: ConnectionPool,
    rooms: RoomRegistry,
    config: RealtimeConfig,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(config: RealtimeConfig) -> Self {
        Self {
            pool: ConnectionPool::new(),
            rooms: RoomRegistry::new(),
            config,
        }
    }

    /// Registers a new authenticated connection and joins its rooms.
    ///
    /// Returns the handle and the receiver the socket task drains.
    pub fn register(
        &self,
        identity: ConnectionIdentity,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(identity, tx));

        self.pool.add(handle.clone());
        if handle.is_admin() {
            self.rooms.join(ADMINS_ROOM, handle.id);
        }
        self.rooms.join(user_room(&handle.user_id), handle.id);

        info!(
            conn_id = %handle.id,
            user_id = %handle.user_id,
            admin = handle.is_admin(),
            "WebSocket connection registered"
        );

        (handle, rx)
    }

    /// Removes a connection from the pool and its rooms. Returns the handle
    /// only on the first call for a given connection.
    pub fn unregister(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let handle = self.pool.remove(conn_id)?;
        handle.close();
        self.rooms.leave_all(conn_id);

        info!(
            conn_id = %conn_id,
            user_id = %handle.user_id,
            "WebSocket connection unregistered"
        );
        Some(handle)
    }

    /// Send a frame to one connection.
    pub fn send_to(&self, handle: &ConnectionHandle, frame: &OutboundFrame) -> bool {
        match frame.to_text() {
            Ok(text) => handle.send(text),
            Err(e) => {
                error!(error = %e, "Failed to serialize outbound frame");
                false
            }
        }
    }

    /// Send a frame to every member of a room. Returns how many accepted it.
    pub fn send_to_room(&self, room: &str, frame: &OutboundFrame) -> usize {
        let members = self.rooms.members(room);
        if members.is_empty() {
            return 0;
        }
        let text = match frame.to_text() {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "Failed to serialize broadcast frame");
                return 0;
            }
        };

        members
            .iter()
            .filter_map(|id| self.pool.get(id))
            .filter(|handle| handle.send(text.clone()))
            .count()
    }

    /// Send a frame to every connection of one account.
    pub fn send_to_user(&self, user_id: &UserId, frame: &OutboundFrame) -> usize {
        self.send_to_room(&user_room(user_id), frame)
    }

    /// Ask every connection of `user_id` to close. The handles stay in the
    /// pool until their socket tasks unregister them.
    pub fn close_user(&self, user_id: &UserId) -> usize {
        let connections = self.pool.user_connections(user_id);
        for conn in &connections {
            conn.close();
        }
        connections.len()
    }

    /// Ask every connection to close.
    pub fn close_all(&self) {
        let all = self.pool.all_connections();
        for conn in &all {
            conn.close();
        }
        info!(count = all.len(), "Closing all connections");
    }

    /// Returns the total connection count.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Ping interval for socket tasks.
    pub fn ping_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.config.ping_interval_seconds.max(1))
    }
}
