//! PostgreSQL implementations of the store traits.

pub mod activity;
pub mod session;
pub mod user;

pub use activity::ActivityRepository;
pub use session::SessionLedgerRepository;
pub use user::UserRepository;
