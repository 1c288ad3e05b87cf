use super::*;

const OVERRIDE_SELECT: &str = r#"
    SELECT
        overrides.id,
        overrides.user_id,
        overrides.permission_id,
        permissions.name AS permission_name,
        overrides.is_granted,
        overrides.scope_type,
        overrides.scope_id,
        overrides.expires_at,
        overrides.reason,
        overrides.created_by,
        overrides.created_at
    FROM user_permission_assignments AS overrides
    INNER JOIN permissions
        ON permissions.id = overrides.permission_id
"#;

/// Storage columns for an optional scope. Blanket rows use an empty type.
fn scope_columns(scope: Option<&PermissionScope>) -> (&'static str, Option<uuid::Uuid>) {
    match scope {
        Some(scope) => (scope.scope_type.as_str(), Some(scope.scope_id)),
        None => ("", None),
    }
}

#[async_trait]
impl UserOverrideRepository for PostgresRbacRepository {
    async fn create_override(&self, input: NewUserOverride) -> AppResult<UserPermissionOverride> {
        let (scope_type, scope_id) = scope_columns(input.scope.as_ref());
        let permission_id = input.permission_id;
        let user_id = input.user_id;

        let row = sqlx::query_as::<_, OverrideRow>(
            r#"
            WITH inserted AS (
                INSERT INTO user_permission_assignments (
                    id,
                    user_id,
                    permission_id,
                    is_granted,
                    scope_type,
                    scope_id,
                    expires_at,
                    reason,
                    created_by
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING *
            )
            SELECT
                inserted.id,
                inserted.user_id,
                inserted.permission_id,
                permissions.name AS permission_name,
                inserted.is_granted,
                inserted.scope_type,
                inserted.scope_id,
                inserted.expires_at,
                inserted.reason,
                inserted.created_by,
                inserted.created_at
            FROM inserted
            INNER JOIN permissions
                ON permissions.id = inserted.permission_id
            "#,
        )
        .bind(OverrideId::new().as_uuid())
        .bind(user_id.as_uuid())
        .bind(permission_id.as_uuid())
        .bind(input.is_granted)
        .bind(scope_type)
        .bind(scope_id)
        .bind(input.expires_at)
        .bind(input.reason)
        .bind(input.created_by.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            map_missing_reference(
                error,
                || format!("user {user_id} or permission {permission_id} not found"),
                "failed to create user override",
            )
        })?;

        row.into_override()
    }

    async fn remove_overrides(&self, removal: OverrideRemoval) -> AppResult<u64> {
        let (blanket_only, scope_type, scope_id) = match removal.scope {
            ScopeFilter::Any => (false, None, None),
            ScopeFilter::Blanket => (true, None, None),
            ScopeFilter::Type(scope_type) => (false, Some(scope_type.as_str()), None),
            ScopeFilter::Exact(scope) => {
                (false, Some(scope.scope_type.as_str()), Some(scope.scope_id))
            }
        };

        let result = sqlx::query(
            r#"
            DELETE FROM user_permission_assignments
            WHERE user_id = $1
                AND permission_id = $2
                AND ($3 = FALSE OR scope_type = '')
                AND ($4::TEXT IS NULL OR scope_type = $4)
                AND ($5::UUID IS NULL OR scope_id = $5)
            "#,
        )
        .bind(removal.user_id.as_uuid())
        .bind(removal.permission_id.as_uuid())
        .bind(blanket_only)
        .bind(scope_type)
        .bind(scope_id)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove user overrides: {error}")))?;

        Ok(result.rows_affected())
    }

    async fn list_overrides(&self, user_id: UserId) -> AppResult<Vec<UserPermissionOverride>> {
        let rows = sqlx::query_as::<_, OverrideRow>(&format!(
            r#"
            {OVERRIDE_SELECT}
            WHERE overrides.user_id = $1
            ORDER BY overrides.created_at, overrides.id
            "#
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list overrides of user {user_id}: {error}"))
        })?;

        collect_overrides(rows)
    }

    async fn list_active_overrides(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<UserPermissionOverride>> {
        let rows = sqlx::query_as::<_, OverrideRow>(&format!(
            r#"
            {OVERRIDE_SELECT}
            WHERE overrides.user_id = $1
                AND (overrides.expires_at IS NULL OR overrides.expires_at > $2)
            ORDER BY overrides.created_at, overrides.id
            "#
        ))
        .bind(user_id.as_uuid())
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list active overrides of user {user_id}: {error}"
            ))
        })?;

        collect_overrides(rows)
    }

    async fn list_active_overrides_for_permission(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<UserPermissionOverride>> {
        let rows = sqlx::query_as::<_, OverrideRow>(&format!(
            r#"
            {OVERRIDE_SELECT}
            WHERE overrides.user_id = $1
                AND overrides.permission_id = $2
                AND (overrides.expires_at IS NULL OR overrides.expires_at > $3)
            ORDER BY overrides.created_at, overrides.id
            "#
        ))
        .bind(user_id.as_uuid())
        .bind(permission_id.as_uuid())
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list overrides of user {user_id} for permission {permission_id}: {error}"
            ))
        })?;

        collect_overrides(rows)
    }

    async fn clear_overrides(&self, user_id: UserId) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM user_permission_assignments WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to clear overrides of user {user_id}: {error}"))
            })?;

        Ok(result.rows_affected())
    }

    async fn cleanup_expired_overrides(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_permission_assignments
            WHERE expires_at IS NOT NULL
                AND expires_at < $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to delete expired overrides: {error}"))
        })?;

        Ok(result.rows_affected())
    }
}
