//! Room registry: which connections are in which room.

use std::collections::HashSet;

use dashmap::DashMap;

use chatdesk_core::types::{ConnectionId, UserId};

/// Room every administrator connection joins.
pub const ADMINS_ROOM: &str = "admins";

/// Private room of one account's connections.
pub fn user_room(user_id: &UserId) -> String {
    format!("user:{user_id}")
}

/// Registry of rooms and their member connections.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    /// Room name → member connections.
    rooms: DashMap<String, HashSet<ConnectionId>>,
    /// Connection → rooms it joined (reverse index).
    memberships: DashMap<ConnectionId, Vec<String>>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to a room.
    pub fn join(&self, room: impl Into<String>, conn_id: ConnectionId) {
        let room = room.into();
        if self.rooms.entry(room.clone()).or_default().insert(conn_id) {
            self.memberships.entry(conn_id).or_default().push(room);
        }
    }

    /// Removes a connection from every room it joined.
    pub fn leave_all(&self, conn_id: &ConnectionId) {
        let Some((_, rooms)) = self.memberships.remove(conn_id) else {
            return;
        };
        for room in &rooms {
            self.rooms.remove_if_mut(room, |_, members| {
                members.remove(conn_id);
                members.is_empty()
            });
        }
    }

    /// Current members of a room.
    pub fn members(&self, room: &str) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of non-empty rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
