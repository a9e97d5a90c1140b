//! # chatdesk-database
//!
//! Persistence collaborators for the session subsystem: the traits the
//! login and presence paths are written against, PostgreSQL repositories
//! implementing them with single conditional statements, and an in-memory
//! store for tests and single-node development.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{
    AccountDirectory, AcquireOutcome, ActivityLog, MemoryStore, ReleaseOutcome, SessionLedger,
    Stores,
};
