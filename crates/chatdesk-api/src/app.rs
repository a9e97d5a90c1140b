//! Application builder: wires state, router and middleware into an Axum app.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use chatdesk_auth::jwt::{JwtDecoder, JwtEncoder};
use chatdesk_auth::session::{LoginArbiter, SessionVerifier};
use chatdesk_core::config::AppConfig;
use chatdesk_core::types::BootEpoch;
use chatdesk_database::Stores;
use chatdesk_realtime::RealtimeEngine;
use chatdesk_realtime::connection::WsAuthenticator;

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Construct every shared component for one process run.
///
/// `boot` is the epoch credentials are checked against; pass
/// [`BootEpoch::capture`] at startup.
pub fn build_state(config: AppConfig, stores: Stores, boot: BootEpoch) -> AppState {
    if config.auth.jwt_secret.is_none() {
        tracing::warn!("No signing secret configured; logins will fail until one is set");
    }

    let encoder = Arc::new(JwtEncoder::new(&config.auth));
    let decoder = Arc::new(JwtDecoder::new(&config.auth, boot));

    let realtime = Arc::new(RealtimeEngine::new(
        config.realtime.clone(),
        config.session.clone(),
        &stores,
    ));

    let arbiter = Arc::new(LoginArbiter::new(
        &stores,
        realtime.presence.clone(),
        realtime.fanout.clone(),
        encoder,
        decoder.clone(),
        config.session.clone(),
    ));
    let verifier = Arc::new(SessionVerifier::new(
        decoder.clone(),
        stores.directory.clone(),
        stores.ledger.clone(),
    ));
    let authenticator = Arc::new(WsAuthenticator::new(decoder));

    info!(boot = boot.as_secs(), "Application state initialized");

    AppState {
        config: Arc::new(config),
        stores,
        arbiter,
        verifier,
        authenticator,
        realtime,
    }
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
