//! Credential verification.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use chatdesk_core::config::AuthConfig;
use chatdesk_core::error::AppError;
use chatdesk_core::result::AppResult;
use chatdesk_core::types::BootEpoch;

use super::claims::Claims;

/// Verifies HS256 credentials against the secret and the boot epoch.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: Option<DecodingKey>,
    validation: Validation,
    boot: BootEpoch,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("configured", &self.decoding_key.is_some())
            .field("boot", &self.boot)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder for credentials of this process run.
    pub fn new(config: &AuthConfig, boot: BootEpoch) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;

        Self {
            decoding_key: config.secret().map(|s| DecodingKey::from_secret(s.as_bytes())),
            validation,
            boot,
        }
    }

    /// Boot epoch this decoder checks against.
    pub fn boot(&self) -> BootEpoch {
        self.boot
    }

    /// Check signature and expiry only. Used by logout, which must work
    /// for any credential the server ever signed.
    pub fn decode(&self, token: &str) -> AppResult<Claims> {
        let key = self
            .decoding_key
            .as_ref()
            .ok_or_else(|| AppError::configuration("JWT secret is not configured"))?;

        decode::<Claims>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => AppError::authentication("Token has expired"),
                JwtErrorKind::InvalidSignature => AppError::authentication("Invalid token signature"),
                _ => AppError::authentication(format!("Invalid token: {e}")),
            })
    }

    /// Full check: signature, expiry, and issued during this process run.
    pub fn authenticate(&self, token: &str) -> AppResult<Claims> {
        let claims = self.decode(token)?;
        if self.boot.predates(claims.iat) {
            return Err(AppError::authentication("Session expired"));
        }
        Ok(claims)
    }
}
