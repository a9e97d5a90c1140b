//! Axum middleware helpers.

pub mod cors;
pub mod rbac;
