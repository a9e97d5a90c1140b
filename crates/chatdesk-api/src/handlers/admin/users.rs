//! Admin account session control.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use chatdesk_core::error::AppError;
use chatdesk_core::events::AdminEvent;
use chatdesk_core::task::spawn_detached;
use chatdesk_core::types::UserId;
use chatdesk_database::{AccountDirectory, ActivityLog};
use chatdesk_entity::activity::CreateAuditEntry;

use crate::dto::request::ChangeStatusRequest;
use crate::dto::response::StatusResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::middleware::rbac::{require_admin, require_unprotected};
use crate::state::AppState;

/// POST /api/admin/users/{id}/force-logout
pub async fn force_logout(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_admin(&auth)?;
    let user_id = UserId::from_uuid(id);

    let target = state
        .stores
        .directory
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    require_unprotected(&auth, &target.username, &state.config.admin)?;

    let closed = state.realtime.control.force_logout(user_id, "kicked");

    record_audit(
        &state,
        &auth,
        "FORCE_LOGOUT",
        user_id,
        json!({ "username": target.username, "reason": "kicked", "connections": closed }),
    );

    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/admin/users/{id}/status
///
/// Disabling an active account also forces it out.
pub async fn set_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangeStatusRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    require_admin(&auth)?;
    let user_id = UserId::from_uuid(id);

    let target = state
        .stores
        .directory
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    require_unprotected(&auth, &target.username, &state.config.admin)?;

    let previous = state
        .stores
        .directory
        .set_active(&user_id, req.is_active)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let disabled = previous && !req.is_active;
    if disabled {
        state.realtime.control.force_logout(user_id, "disabled");
    }

    if previous != req.is_active {
        record_audit(
            &state,
            &auth,
            "UPDATE_USER",
            user_id,
            json!({ "changes": { "isActive": { "from": previous, "to": req.is_active } } }),
        );
    }

    state.realtime.fanout.emit_admin_event(
        AdminEvent::user_updated(
            user_id,
            target.username,
            target.role.as_str(),
            req.is_active,
        )
        .with_ip(auth.ip.clone()),
    );

    Ok(Json(StatusResponse {
        id: user_id,
        is_active: req.is_active,
        forced_logout: disabled,
    }))
}

fn record_audit(
    state: &AppState,
    auth: &AuthUser,
    action: &str,
    target: UserId,
    metadata: serde_json::Value,
) {
    let entry = CreateAuditEntry {
        actor_id: auth.user_id,
        actor_ip: auth.ip.clone(),
        action: action.to_string(),
        target_id: Some(target),
        metadata,
    };
    let activity = state.stores.activity.clone();
    spawn_detached("record_audit", async move { activity.record_audit(entry).await });
}
