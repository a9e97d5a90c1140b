//! Live-connection presence.

pub mod coordinator;

pub use coordinator::PresenceCoordinator;
