//! Named groups of connections.

pub mod registry;

pub use registry::{ADMINS_ROOM, RoomRegistry, user_room};
