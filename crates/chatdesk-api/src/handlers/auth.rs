//! Auth handlers: login, logout, me.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use validator::Validate;

use chatdesk_core::error::AppError;

use crate::dto::request::LoginRequest;
use crate::dto::response::{LoginResponse, MeResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, BearerToken, ClientIp};
use crate::state::AppState;

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let outcome = state.arbiter.login(&req.username, ip).await?;

    Ok(Json(LoginResponse {
        token: outcome.token,
    }))
}

/// POST /api/logout
///
/// 204 for any validly signed credential, whether or not it still held
/// the session.
pub async fn logout(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    BearerToken(token): BearerToken,
) -> Result<StatusCode, ApiError> {
    state.arbiter.logout(&token, ip).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/me
pub async fn me(auth: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        id: auth.user_id,
        username: auth.username,
        role: auth.role.to_string(),
        session_id: auth.session_id,
        issued_at: auth.claims.issued_at(),
    })
}
