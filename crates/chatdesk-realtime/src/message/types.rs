//! Inbound and outbound WebSocket frames: `{"event": "...", "data": ...}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chatdesk_core::events::{AdminEvent, UserEvent};
use chatdesk_core::types::UserId;

/// Frames sent by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum OutboundFrame {
    /// Activity notification for administrators.
    #[serde(rename = "admin:event")]
    AdminEvent(AdminEvent),
    /// Users online at the moment an admin connected.
    #[serde(rename = "admin:presence_snapshot")]
    PresenceSnapshot(Vec<UserId>),
    /// Notice for this account only.
    #[serde(rename = "user:event")]
    UserEvent(UserEvent),
    /// Keep-alive.
    #[serde(rename = "ping")]
    Ping {
        /// Server time.
        at: DateTime<Utc>,
    },
    /// Protocol error.
    #[serde(rename = "error")]
    Error {
        /// Machine-readable code.
        code: String,
        /// Human-readable detail.
        message: String,
    },
}

impl OutboundFrame {
    /// Serialize to a text frame payload.
    pub fn to_text(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Frames accepted from clients. The channel is server-push; clients only
/// answer keep-alives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum InboundFrame {
    /// Reply to a server ping.
    #[serde(rename = "pong")]
    Pong,
    /// Client-initiated keep-alive.
    #[serde(rename = "ping")]
    Ping,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_event_envelope() {
        let user_id = UserId::new();
        let frame = OutboundFrame::AdminEvent(AdminEvent::presence(user_id, false));
        let json: serde_json::Value = serde_json::from_str(&frame.to_text().unwrap()).unwrap();

        assert_eq!(json["event"], "admin:event");
        assert_eq!(json["data"]["type"], "PRESENCE");
        assert_eq!(json["data"]["online"], false);
        assert_eq!(json["data"]["userId"], user_id.to_string());
    }

    #[test]
    fn test_snapshot_is_id_array() {
        let id = UserId::new();
        let json = serde_json::to_value(OutboundFrame::PresenceSnapshot(vec![id])).unwrap();
        assert_eq!(json["event"], "admin:presence_snapshot");
        assert_eq!(json["data"][0], id.to_string());
    }

    #[test]
    fn test_user_event_envelope() {
        let json =
            serde_json::to_value(OutboundFrame::UserEvent(UserEvent::force_logout("kicked")))
                .unwrap();
        assert_eq!(json["event"], "user:event");
        assert_eq!(json["data"]["type"], "FORCE_LOGOUT");
        assert_eq!(json["data"]["reason"], "kicked");
    }

    #[test]
    fn test_inbound_pong() {
        let frame: InboundFrame = serde_json::from_str(r#"{"event":"pong"}"#).unwrap();
        assert!(matches!(frame, InboundFrame::Pong));
        assert!(serde_json::from_str::<InboundFrame>(r#"{"event":"subscribe"}"#).is_err());
    }
}
