//! # chatdesk-realtime
//!
//! Live-connection side of the session subsystem:
//!
//! - WebSocket connection handles, pool and rooms
//! - Presence coordination with offline debounce and disconnect-driven
//!   logout bookkeeping
//! - Admin and per-user event fan-out
//! - Administrator forced logout

pub mod connection;
pub mod fanout;
pub mod message;
pub mod presence;
pub mod room;
pub mod server;
pub mod session_control;

pub use connection::manager::ConnectionManager;
pub use fanout::EventFanout;
pub use presence::coordinator::PresenceCoordinator;
pub use server::RealtimeEngine;
pub use session_control::SessionControl;
