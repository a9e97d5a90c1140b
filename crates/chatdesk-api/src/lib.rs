//! # chatdesk-api
//!
//! HTTP API layer for Chatdesk built on Axum.
//!
//! Login/logout, the session-checked `/me`, admin presence and forced
//! logout, the WebSocket upgrade, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state};
pub use error::ApiError;
pub use state::AppState;
