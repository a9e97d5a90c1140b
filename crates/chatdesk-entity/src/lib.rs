//! # chatdesk-entity
//!
//! Domain entity models for Chatdesk. Row types derive `sqlx::FromRow`;
//! value objects describe the single held session and the append-only
//! activity records written around it.

pub mod activity;
pub mod session;
pub mod user;
