//! Single-session lifecycle: key generation, login/logout arbitration and
//! per-request verification.

pub mod arbiter;
pub mod key;
pub mod verifier;

pub use arbiter::{LoginArbiter, LoginOutcome};
pub use key::generate_session_key;
pub use verifier::{SessionVerifier, VerifiedSession};
