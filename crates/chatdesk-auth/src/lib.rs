//! # chatdesk-auth
//!
//! Credentials and the single-session lock.
//!
//! ## Modules
//!
//! - `jwt`: bearer credential issue and verification, boot-epoch aware
//! - `session`: session key generation, the login arbiter and the
//!   per-request session verifier

pub mod jwt;
pub mod session;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use session::{LoginArbiter, LoginOutcome, SessionVerifier, VerifiedSession};
