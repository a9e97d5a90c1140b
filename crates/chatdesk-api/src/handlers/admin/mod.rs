//! Admin-only handlers.

pub mod presence;
pub mod users;
