//! WebSocket frame definitions.

pub mod types;

pub use types::{InboundFrame, OutboundFrame};
