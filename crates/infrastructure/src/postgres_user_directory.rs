use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use agrinova_application::UserDirectory;
use agrinova_core::{AppError, AppResult, UserId, UserIdentity};

/// PostgreSQL-backed identity lookup over the `users` table.
#[derive(Clone)]
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    /// Creates a directory with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: uuid::Uuid,
    role: String,
    is_active: bool,
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserIdentity>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, role, is_active
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user {user_id}: {error}")))?;

        Ok(row.map(|row| UserIdentity::new(UserId::from_uuid(row.id), row.role, row.is_active)))
    }
}
