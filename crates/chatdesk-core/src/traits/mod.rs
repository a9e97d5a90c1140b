//! Seams between the login path and the live-connection layer.
//!
//! The auth crate needs to ask "is this account online?" and to publish
//! admin events without depending on the realtime crate that answers.

pub mod event_sink;
pub mod presence;

pub use event_sink::AdminEventSink;
pub use presence::PresenceView;
