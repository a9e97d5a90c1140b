//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chatdesk_core::types::{SessionKey, UserId};

/// Successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer credential.
    pub token: String,
}

/// The caller's identity, as checked against the live session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    /// Account id.
    pub id: UserId,
    /// Username.
    pub username: String,
    /// `admin` or `user`.
    pub role: String,
    /// Current session.
    pub session_id: SessionKey,
    /// When the credential was issued.
    pub issued_at: DateTime<Utc>,
}

/// Accounts with at least one live connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceResponse {
    /// Online account ids.
    pub online: Vec<UserId>,
    /// Open WebSocket connections.
    pub connections: usize,
}

/// Result of an account status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Account id.
    pub id: UserId,
    /// Active flag after the change.
    pub is_active: bool,
    /// Whether live connections were closed as part of the change.
    pub forced_logout: bool,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Seconds since the boot epoch.
    pub uptime_seconds: i64,
    /// Open WebSocket connections.
    pub ws_connections: usize,
}
