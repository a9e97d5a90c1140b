//! Admin presence view.

use axum::Json;
use axum::extract::State;

use chatdesk_core::traits::PresenceView;

use crate::dto::response::PresenceResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::middleware::rbac::require_admin;
use crate::state::AppState;

/// GET /api/admin/presence
pub async fn online_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<PresenceResponse>, ApiError> {
    require_admin(&auth)?;
    Ok(Json(PresenceResponse {
        online: state.realtime.presence.online_users(),
        connections: state.realtime.connections.connection_count(),
    }))
}
