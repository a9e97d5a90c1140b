//! Admin and per-user event fan-out over live connections.

use std::sync::Arc;

use tracing::debug;

use chatdesk_core::events::{AdminEvent, UserEvent};
use chatdesk_core::traits::AdminEventSink;
use chatdesk_core::types::UserId;

use crate::connection::manager::ConnectionManager;
use crate::message::types::OutboundFrame;
use crate::room::ADMINS_ROOM;

/// Delivers events to the `admins` room and to `user:{id}` rooms.
/// At-most-once, no backlog.
#[derive(Debug, Clone)]
pub struct EventFanout {
    connections: Arc<ConnectionManager>,
}

impl EventFanout {
    /// Creates a fan-out over `connections`.
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self { connections }
    }

    /// Deliver `event` to all admin connections.
    pub fn emit_admin_event(&self, event: AdminEvent) -> usize {
        let kind = event.type_name();
        let delivered = self
            .connections
            .send_to_room(ADMINS_ROOM, &OutboundFrame::AdminEvent(event));
        debug!(event = kind, delivered, "Admin event emitted");
        delivered
    }

    /// Deliver `event` to one account's own connections.
    pub fn emit_user_event(&self, user_id: &UserId, event: UserEvent) -> usize {
        self.connections
            .send_to_user(user_id, &OutboundFrame::UserEvent(event))
    }
}

impl AdminEventSink for EventFanout {
    fn publish(&self, event: AdminEvent) {
        self.emit_admin_event(event);
    }
}
