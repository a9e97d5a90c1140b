//! Integration tests driving the HTTP router against the in-memory store.

mod admin_test;
mod auth_test;
mod helpers;
mod restart_test;
