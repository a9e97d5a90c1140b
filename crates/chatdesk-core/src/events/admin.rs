//! Administrator-facing activity events.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{SessionKey, UserId};

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoutReason {
    /// Explicit `POST /logout`.
    Logout,
    /// Last live connection closed and stayed closed past the debounce.
    Disconnect,
    /// An administrator kicked the account.
    Forced,
    /// A new login replaced an abandoned session.
    Takeover,
}

impl LogoutReason {
    /// Lowercase label, as stored in activity records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Logout => "logout",
            Self::Disconnect => "disconnect",
            Self::Forced => "forced",
            Self::Takeover => "takeover",
        }
    }
}

impl fmt::Display for LogoutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-specific part of an [`AdminEvent`], serialized under `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminEventKind {
    /// A session was granted.
    Login,
    /// A session ended.
    Logout {
        /// What ended it.
        reason: LogoutReason,
    },
    /// The account's presence changed.
    Presence {
        /// `true` on the first live connection, `false` once confirmed offline.
        online: bool,
    },
    /// An administrator forced the account out.
    ForceLogout {
        /// Free-form reason (`"kicked"`, `"disabled"`, ...).
        reason: String,
    },
    /// A login replaced an abandoned session.
    SessionTakeover {
        /// The replaced session.
        previous_session: SessionKey,
    },
    /// An administrator changed the account's record.
    #[serde(rename_all = "camelCase")]
    UserUpdated {
        /// Role after the change.
        role: String,
        /// Status after the change.
        is_active: bool,
    },
}

/// A single admin notification: `{type, userId, username?, ip?, at}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminEvent {
    /// Event type and its specific fields.
    #[serde(flatten)]
    pub kind: AdminEventKind,
    /// The account concerned.
    pub user_id: UserId,
    /// Username, when known to the emitter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Client IP of the request that triggered the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// When the event was emitted.
    pub at: DateTime<Utc>,
}

impl AdminEvent {
    /// Build an event stamped with the current time.
    pub fn new(kind: AdminEventKind, user_id: UserId) -> Self {
        Self {
            kind,
            user_id,
            username: None,
            ip: None,
            at: Utc::now(),
        }
    }

    /// `LOGIN`
    pub fn login(user_id: UserId, username: impl Into<String>) -> Self {
        Self::new(AdminEventKind::Login, user_id).with_username(username)
    }

    /// `LOGOUT`
    pub fn logout(user_id: UserId, reason: LogoutReason) -> Self {
        Self::new(AdminEventKind::Logout { reason }, user_id)
    }

    /// `PRESENCE`
    pub fn presence(user_id: UserId, online: bool) -> Self {
        Self::new(AdminEventKind::Presence { online }, user_id)
    }

    /// `FORCE_LOGOUT`
    pub fn force_logout(user_id: UserId, reason: impl Into<String>) -> Self {
        Self::new(
            AdminEventKind::ForceLogout {
                reason: reason.into(),
            },
            user_id,
        )
    }

    /// `SESSION_TAKEOVER`
    pub fn takeover(user_id: UserId, previous_session: SessionKey) -> Self {
        Self::new(AdminEventKind::SessionTakeover { previous_session }, user_id)
    }

    /// `USER_UPDATED`
    pub fn user_updated(
        user_id: UserId,
        username: impl Into<String>,
        role: impl Into<String>,
        is_active: bool,
    ) -> Self {
        Self::new(
            AdminEventKind::UserUpdated {
                role: role.into(),
                is_active,
            },
            user_id,
        )
        .with_username(username)
    }

    /// Attach a username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Attach an optional username.
    pub fn with_username_opt(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }

    /// Attach the client IP, skipping empty values.
    pub fn with_ip(mut self, ip: Option<String>) -> Self {
        self.ip = ip.filter(|s| !s.is_empty());
        self
    }

    /// The wire name of the event type.
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            AdminEventKind::Login => "LOGIN",
            AdminEventKind::Logout { .. } => "LOGOUT",
            AdminEventKind::Presence { .. } => "PRESENCE",
            AdminEventKind::ForceLogout { .. } => "FORCE_LOGOUT",
            AdminEventKind::SessionTakeover { .. } => "SESSION_TAKEOVER",
            AdminEventKind::UserUpdated { .. } => "USER_UPDATED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_wire_shape() {
        let user_id = UserId::new();
        let event = AdminEvent::presence(user_id, true);
        let json = serde_json::to_value(&event).expect("serialize");

        assert_eq!(json["type"], "PRESENCE");
        assert_eq!(json["online"], true);
        assert_eq!(json["userId"], user_id.to_string());
        assert!(json.get("username").is_none());
        assert!(json.get("ip").is_none());
        assert!(json.get("at").is_some());
    }

    #[test]
    fn test_login_carries_username_and_ip() {
        let event = AdminEvent::login(UserId::new(), "alice").with_ip(Some("10.0.0.7".into()));
        let json = serde_json::to_value(&event).expect("serialize");

        assert_eq!(json["type"], "LOGIN");
        assert_eq!(json["username"], "alice");
        assert_eq!(json["ip"], "10.0.0.7");
    }

    #[test]
    fn test_user_updated_wire_shape() {
        let event = AdminEvent::user_updated(UserId::new(), "bob", "user", false)
            .with_ip(Some("10.0.0.9".into()));
        let json = serde_json::to_value(&event).expect("serialize");

        assert_eq!(json["type"], "USER_UPDATED");
        assert_eq!(json["username"], "bob");
        assert_eq!(json["role"], "user");
        assert_eq!(json["isActive"], false);
        assert_eq!(json["ip"], "10.0.0.9");
        assert_eq!(event.type_name(), "USER_UPDATED");
    }

    #[test]
    fn test_empty_ip_is_dropped() {
        let event = AdminEvent::logout(UserId::new(), LogoutReason::Logout).with_ip(Some(String::new()));
        assert!(event.ip.is_none());
        assert_eq!(event.type_name(), "LOGOUT");
    }

    #[test]
    fn test_parses_back() {
        let event = AdminEvent::takeover(UserId::new(), SessionKey::new("abc"));
        let json = serde_json::to_string(&event).expect("serialize");
        let parsed: AdminEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, event);
    }
}
