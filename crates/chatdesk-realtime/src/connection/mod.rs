//! WebSocket connection management: handles, pool, authentication.

pub mod authenticator;
pub mod handle;
pub mod manager;
pub mod pool;

pub use authenticator::{ConnectionIdentity, WsAuthenticator};
pub use handle::ConnectionHandle;
pub use manager::ConnectionManager;
