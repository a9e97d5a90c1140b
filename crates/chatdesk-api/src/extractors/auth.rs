//! `AuthUser` extractor: pulls the bearer credential, runs the full
//! session check and injects the caller's identity.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use chatdesk_auth::jwt::Claims;
use chatdesk_core::error::AppError;
use chatdesk_core::types::{SessionKey, UserId};
use chatdesk_entity::user::UserRole;

use crate::error::ApiError;
use crate::extractors::client_ip::ClientIp;
use crate::state::AppState;

/// Raw bearer credential, without any verification.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::authentication("Missing bearer token"))?;
        Ok(Self(bearer.token().to_string()))
    }
}

/// An authenticated caller whose credential names the live session.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Account id.
    pub user_id: UserId,
    /// Username as stored.
    pub username: String,
    /// Role as stored.
    pub role: UserRole,
    /// Session the credential belongs to.
    pub session_id: SessionKey,
    /// Client address, for audit and admin events.
    pub ip: Option<String>,
    /// The verified claims.
    pub claims: Claims,
}

impl AuthUser {
    /// Whether the caller is an administrator.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let verified = state.verifier.verify(&token).await?;
        let ClientIp(ip) = match ClientIp::from_request_parts(parts, state).await {
            Ok(ip) => ip,
            Err(never) => match never {},
        };

        Ok(AuthUser {
            user_id: verified.user.id,
            username: verified.user.username,
            role: verified.user.role,
            session_id: verified.claims.sid.clone(),
            ip,
            claims: verified.claims,
        })
    }
}
