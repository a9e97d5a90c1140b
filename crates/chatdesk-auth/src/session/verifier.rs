//! Per-request session check.

use std::sync::Arc;

use chatdesk_core::error::AppError;
use chatdesk_core::result::AppResult;
use chatdesk_database::{AccountDirectory, SessionLedger};
use chatdesk_entity::user::User;

use crate::jwt::{Claims, JwtDecoder};

/// A credential that passed every check, with the account it names.
#[derive(Debug, Clone)]
pub struct VerifiedSession {
    /// Decoded claims.
    pub claims: Claims,
    /// The account as currently stored.
    pub user: User,
}

/// Verifies that a bearer credential still names the live session.
#[derive(Clone)]
pub struct SessionVerifier {
    decoder: Arc<JwtDecoder>,
    directory: Arc<dyn AccountDirectory>,
    ledger: Arc<dyn SessionLedger>,
}

impl std::fmt::Debug for SessionVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionVerifier")
            .field("boot", &self.decoder.boot())
            .finish_non_exhaustive()
    }
}

impl SessionVerifier {
    /// Create a verifier.
    pub fn new(
        decoder: Arc<JwtDecoder>,
        directory: Arc<dyn AccountDirectory>,
        ledger: Arc<dyn SessionLedger>,
    ) -> Self {
        Self {
            decoder,
            directory,
            ledger,
        }
    }

    /// Check, in order: signature and expiry, issued this run, account
    /// exists (401), account active (403), and the credential's `sid` is
    /// the session the ledger holds (401).
    pub async fn verify(&self, token: &str) -> AppResult<VerifiedSession> {
        let claims = self.decoder.authenticate(token)?;

        let user = self
            .directory
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| AppError::authentication("User not found"))?;

        if !user.is_active {
            return Err(AppError::authorization("Account disabled"));
        }

        let held = self.ledger.find_active_session(&claims.sub).await?;
        match held {
            Some(session) if session.session_id == claims.sid => Ok(VerifiedSession { claims, user }),
            _ => Err(AppError::authentication("Session expired")),
        }
    }
}
