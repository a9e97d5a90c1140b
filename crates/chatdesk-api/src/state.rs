//! Application state shared across all handlers.

use std::sync::Arc;

use chatdesk_auth::session::{LoginArbiter, SessionVerifier};
use chatdesk_core::config::AppConfig;
use chatdesk_database::Stores;
use chatdesk_realtime::RealtimeEngine;
use chatdesk_realtime::connection::WsAuthenticator;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Persistence collaborators
    pub stores: Stores,
    /// Login/logout decisions
    pub arbiter: Arc<LoginArbiter>,
    /// Per-request session check
    pub verifier: Arc<SessionVerifier>,
    /// WebSocket credential check
    pub authenticator: Arc<WsAuthenticator>,
    /// WebSocket realtime engine
    pub realtime: Arc<RealtimeEngine>,
}
