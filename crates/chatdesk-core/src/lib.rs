//! # chatdesk-core
//!
//! Core crate for Chatdesk. Contains the configuration schema, typed
//! identifiers, the boot epoch, admin and user event payloads, the
//! presence/event-sink seams, detached-task spawning, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other Chatdesk crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod task;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
