//! Session ledger over the lock columns of `users`.
//!
//! Each operation is a single statement; the conditional `WHERE` clauses
//! carry the whole acquire/replace/release protocol.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use chatdesk_core::error::{AppError, ErrorKind};
use chatdesk_core::result::AppResult;
use chatdesk_core::types::{BootEpoch, SessionKey, UserId};
use chatdesk_entity::session::{ActiveSession, SessionGrant};

use crate::store::{AcquireOutcome, ReleaseOutcome, SessionLedger};

/// Row returned by the acquire statement: the locked pre-image plus
/// whether the update fired.
#[derive(Debug, FromRow)]
struct AcquireRow {
    is_active: bool,
    session_id: Option<String>,
    session_boot_sec: Option<i64>,
    session_created_at: Option<DateTime<Utc>>,
    acquired: bool,
}

#[derive(Debug, FromRow)]
struct SessionRow {
    session_id: Option<String>,
    session_boot_sec: Option<i64>,
    session_created_at: Option<DateTime<Utc>>,
}

fn to_active(
    session_id: Option<String>,
    boot: Option<i64>,
    created_at: Option<DateTime<Utc>>,
) -> Option<ActiveSession> {
    Some(ActiveSession {
        session_id: SessionKey::new(session_id?),
        boot: BootEpoch::from_secs(boot?),
        created_at: created_at?,
    })
}

fn db_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

/// PostgreSQL-backed [`SessionLedger`].
#[derive(Debug, Clone)]
pub struct SessionLedgerRepository {
    pool: PgPool,
}

impl SessionLedgerRepository {
    /// Create a new ledger repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionLedger for SessionLedgerRepository {
    async fn find_active_session(&self, user_id: &UserId) -> AppResult<Option<ActiveSession>> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT session_id, session_boot_sec, session_created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to read session"))?;

        Ok(row.and_then(|r| to_active(r.session_id, r.session_boot_sec, r.session_created_at)))
    }

    async fn try_acquire_session(
        &self,
        user_id: &UserId,
        grant: &SessionGrant,
        stale_before: DateTime<Utc>,
    ) -> AppResult<AcquireOutcome> {
        let row = sqlx::query_as::<_, AcquireRow>(
            r#"
            WITH target AS (
                SELECT id, is_active, session_id, session_boot_sec, session_created_at
                FROM users
                WHERE id = $1
                FOR UPDATE
            ),
            granted AS (
                UPDATE users u
                SET session_id = $2,
                    session_boot_sec = $3,
                    session_created_at = $4,
                    last_login_at = $4,
                    updated_at = NOW()
                FROM target t
                WHERE u.id = t.id
                  AND t.is_active
                  AND (
                      t.session_id IS NULL
                      OR t.session_boot_sec IS DISTINCT FROM $3
                      OR t.session_created_at < $5
                  )
                RETURNING u.id
            )
            SELECT t.is_active, t.session_id, t.session_boot_sec, t.session_created_at,
                   EXISTS (SELECT 1 FROM granted) AS acquired
            FROM target t
            "#,
        )
        .bind(user_id)
        .bind(grant.session_id.as_str())
        .bind(grant.boot.as_secs())
        .bind(grant.issued_at)
        .bind(stale_before)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to acquire session"))?;

        let Some(row) = row else {
            return Ok(AcquireOutcome::Ineligible);
        };
        if row.acquired {
            return Ok(AcquireOutcome::Acquired);
        }
        if !row.is_active {
            return Ok(AcquireOutcome::Ineligible);
        }
        to_active(row.session_id, row.session_boot_sec, row.session_created_at)
            .map(AcquireOutcome::Held)
            .ok_or_else(|| AppError::internal("Acquire refused without a held session"))
    }

    async fn replace_session(
        &self,
        user_id: &UserId,
        expected_previous: &SessionKey,
        grant: &SessionGrant,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET session_id = $3,
                session_boot_sec = $4,
                session_created_at = $5,
                last_login_at = $5,
                updated_at = NOW()
            WHERE id = $1 AND is_active AND session_id = $2
            "#,
        )
        .bind(user_id)
        .bind(expected_previous.as_str())
        .bind(grant.session_id.as_str())
        .bind(grant.boot.as_secs())
        .bind(grant.issued_at)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to replace session"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn release_session(
        &self,
        user_id: &UserId,
        expected: Option<&SessionKey>,
        now: DateTime<Utc>,
    ) -> AppResult<ReleaseOutcome> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET session_id = NULL,
                session_boot_sec = NULL,
                session_created_at = NULL,
                last_logout_at = $3,
                updated_at = NOW()
            WHERE id = $1
              AND session_id IS NOT NULL
              AND ($2::text IS NULL OR session_id = $2)
            "#,
        )
        .bind(user_id)
        .bind(expected.map(SessionKey::as_str))
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to release session"))?;

        Ok(if result.rows_affected() == 1 {
            ReleaseOutcome::Cleared
        } else {
            ReleaseOutcome::Noop
        })
    }

    async fn force_release(&self, user_id: &UserId, now: DateTime<Utc>) -> AppResult<bool> {
        let previous = sqlx::query_scalar::<_, Option<String>>(
            r#"
            WITH old AS (
                SELECT id, session_id FROM users WHERE id = $1 FOR UPDATE
            )
            UPDATE users u
            SET session_id = NULL,
                session_boot_sec = NULL,
                session_created_at = NULL,
                last_logout_at = $2,
                updated_at = NOW()
            FROM old
            WHERE u.id = old.id
            RETURNING old.session_id
            "#,
        )
        .bind(user_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to force-release session"))?;

        Ok(previous.flatten().is_some())
    }

    async fn last_logout_at(&self, user_id: &UserId) -> AppResult<Option<DateTime<Utc>>> {
        let value = sqlx::query_scalar::<_, Option<DateTime<Utc>>>(
            "SELECT last_logout_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to read last logout"))?;

        Ok(value.flatten())
    }
}
