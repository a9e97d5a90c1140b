//! Append-only activity records: logins, logouts and admin audit entries.

pub mod audit;
pub mod login;
pub mod logout;

pub use audit::{AuditEntry, CreateAuditEntry};
pub use login::LoginEvent;
pub use logout::LogoutEvent;
