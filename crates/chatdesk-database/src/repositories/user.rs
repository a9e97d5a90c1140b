//! User repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use chatdesk_core::error::{AppError, ErrorKind};
use chatdesk_core::result::AppResult;
use chatdesk_core::types::UserId;
use chatdesk_entity::user::{User, UserRole};

use crate::store::AccountDirectory;

/// Account lookups against the `users` table.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountDirectory for UserRepository {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(username) = LOWER($1)")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by username", e)
            })
    }

    async fn find_by_id(&self, user_id: &UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    async fn set_active(&self, user_id: &UserId, active: bool) -> AppResult<Option<bool>> {
        sqlx::query_scalar::<_, bool>(
            r#"
            WITH old AS (
                SELECT id, is_active FROM users WHERE id = $1 FOR UPDATE
            )
            UPDATE users u
            SET is_active = $2, updated_at = NOW()
            FROM old
            WHERE u.id = old.id
            RETURNING old.is_active
            "#,
        )
        .bind(user_id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update user status", e))
    }

    async fn ensure_account(&self, username: &str, role: UserRole) -> AppResult<User> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, role)
            VALUES ($1, $2, $3)
            ON CONFLICT ((LOWER(username))) DO NOTHING
            "#,
        )
        .bind(UserId::new())
        .bind(username)
        .bind(role)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create user", e))?;

        self.find_by_username(username)
            .await?
            .ok_or_else(|| AppError::internal(format!("User '{username}' vanished after insert")))
    }
}
