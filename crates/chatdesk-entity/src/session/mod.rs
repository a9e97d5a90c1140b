//! Single-session lock value objects.

pub mod model;

pub use model::{ActiveSession, SessionGrant};
