//! Health check handler.

use axum::Json;
use axum::extract::State;
use chrono::Utc;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = match state.stores.health_check().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "Store health check failed");
            "degraded"
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: (Utc::now() - state.arbiter.boot().started_at()).num_seconds(),
        ws_connections: state.realtime.connections.connection_count(),
    })
}
