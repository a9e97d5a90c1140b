//! Custom Axum extractors.

pub mod auth;
pub mod client_ip;

pub use auth::{AuthUser, BearerToken};
pub use client_ip::ClientIp;
