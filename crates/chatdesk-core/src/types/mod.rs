//! Shared domain types: identifiers, session keys and the boot epoch.

pub mod boot;
pub mod id;
pub mod session_key;

pub use boot::BootEpoch;
pub use id::{ActivityId, ConnectionId, UserId};
pub use session_key::SessionKey;
