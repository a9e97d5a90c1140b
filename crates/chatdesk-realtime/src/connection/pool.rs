//! Connection pool: all live connections indexed by id and by user.

use std::sync::Arc;

use dashmap::DashMap;

use chatdesk_core::types::{ConnectionId, UserId};

use super::handle::ConnectionHandle;

/// Thread-safe pool of all active WebSocket connections.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    /// User ID → that user's connections.
    by_user: DashMap<UserId, Vec<Arc<ConnectionHandle>>>,
    /// Connection ID → connection handle.
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionPool {
    /// Creates a new empty connection pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to the pool.
    pub fn add(&self, handle: Arc<ConnectionHandle>) {
        self.by_id.insert(handle.id, handle.clone());
        self.by_user.entry(handle.user_id).or_default().push(handle);
    }

    /// Removes a connection. Returns the handle the first time only.
    pub fn remove(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let (_, handle) = self.by_id.remove(conn_id)?;
        self.by_user.remove_if_mut(&handle.user_id, |_, connections| {
            connections.retain(|c| c.id != *conn_id);
            connections.is_empty()
        });
        Some(handle)
    }

    /// Gets a specific connection by ID.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(conn_id).map(|entry| entry.value().clone())
    }

    /// Gets all connections for a user.
    pub fn user_connections(&self, user_id: &UserId) -> Vec<Arc<ConnectionHandle>> {
        self.by_user
            .get(user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Returns all connection handles.
    pub fn all_connections(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_id.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Returns total number of active connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }
}
