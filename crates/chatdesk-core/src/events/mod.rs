//! Notifications emitted by the session subsystem.
//!
//! Admin events go to every connected administrator; user events go only
//! to the affected account's own connections. Neither is persisted.

pub mod admin;
pub mod user;

pub use admin::{AdminEvent, AdminEventKind, LogoutReason};
pub use user::{UserEvent, UserEventKind};
