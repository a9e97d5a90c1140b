//! Activity record inserts.

use async_trait::async_trait;
use sqlx::PgPool;

use chatdesk_core::error::{AppError, ErrorKind};
use chatdesk_core::result::AppResult;
use chatdesk_entity::activity::{CreateAuditEntry, LoginEvent, LogoutEvent};

use crate::store::ActivityLog;

/// Writes `login_events`, `logout_events` and `audit_events`.
#[derive(Debug, Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    /// Create a new activity repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityLog for ActivityRepository {
    async fn record_login(&self, event: LoginEvent) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO login_events (id, user_id, ip, takeover, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(event.id)
        .bind(event.user_id)
        .bind(&event.ip)
        .bind(event.takeover)
        .bind(event.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record login", e))?;
        Ok(())
    }

    async fn record_logout(&self, event: LogoutEvent) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO logout_events (id, user_id, reason, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(event.id)
        .bind(event.user_id)
        .bind(event.reason.as_str())
        .bind(event.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record logout", e))?;
        Ok(())
    }

    async fn record_audit(&self, entry: CreateAuditEntry) -> AppResult<()> {
        let entry = entry.into_entry();
        sqlx::query(
            r#"
            INSERT INTO audit_events (id, actor_id, actor_ip, action, target_id, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id)
        .bind(entry.actor_id)
        .bind(&entry.actor_ip)
        .bind(&entry.action)
        .bind(entry.target_id)
        .bind(&entry.metadata)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record audit entry", e))?;
        Ok(())
    }
}
