//! Route definitions for the Chatdesk HTTP API.
//!
//! REST routes are mounted under `/api`; the WebSocket upgrade lives at
//! `/ws`.

use axum::Router;
use axum::routing::{get, patch, post};

use crate::handlers;
use crate::state::AppState;

/// Build the router with all routes, threading `AppState` through each.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(admin_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::ws::ws_handler))
        .with_state(state)
}

/// Login, logout, me
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route("/me", get(handlers::auth::me))
}

/// Admin presence and session control
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/presence", get(handlers::admin::presence::online_users))
        .route(
            "/admin/users/{id}/force-logout",
            post(handlers::admin::users::force_logout),
        )
        .route(
            "/admin/users/{id}/status",
            patch(handlers::admin::users::set_status),
        )
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
