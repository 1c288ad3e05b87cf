use super::*;

const PERMISSION_COLUMNS: &str = r#"
    id,
    name,
    resource,
    action,
    description,
    is_active,
    created_at,
    updated_at
"#;

#[async_trait]
impl PermissionRepository for PostgresRbacRepository {
    async fn create_permission(&self, input: CreatePermissionInput) -> AppResult<Permission> {
        let row = sqlx::query_as::<_, PermissionRow>(&format!(
            r#"
            INSERT INTO permissions (id, name, resource, action, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PERMISSION_COLUMNS}
            "#
        ))
        .bind(PermissionId::new().as_uuid())
        .bind(input.name.as_str())
        .bind(input.resource.as_str())
        .bind(input.action.as_str())
        .bind(input.description.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            map_unique_violation(
                error,
                || format!("permission '{}' already exists", input.name),
                "failed to create permission",
            )
        })?;

        Ok(row.into())
    }

    async fn update_permission(
        &self,
        permission_id: PermissionId,
        input: UpdatePermissionInput,
    ) -> AppResult<Permission> {
        let row = sqlx::query_as::<_, PermissionRow>(&format!(
            r#"
            UPDATE permissions
            SET
                description = COALESCE($2, description),
                is_active = COALESCE($3, is_active),
                updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {PERMISSION_COLUMNS}
            "#
        ))
        .bind(permission_id.as_uuid())
        .bind(input.description)
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update permission: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("permission {permission_id} not found")))?;

        Ok(row.into())
    }

    async fn soft_delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE permissions
            SET is_active = FALSE, deleted_at = now(), updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(permission_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete permission: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "permission {permission_id} not found"
            )));
        }

        Ok(())
    }

    async fn find_permission_by_id(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        let row = sqlx::query_as::<_, PermissionRow>(&format!(
            "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(permission_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find permission: {error}")))?;

        Ok(row.map(Permission::from))
    }

    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        let row = sqlx::query_as::<_, PermissionRow>(&format!(
            "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE name = $1 AND deleted_at IS NULL"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find permission '{name}': {error}"))
        })?;

        Ok(row.map(Permission::from))
    }

    async fn list_permissions(&self, active_only: bool) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(&format!(
            r#"
            SELECT {PERMISSION_COLUMNS}
            FROM permissions
            WHERE deleted_at IS NULL
                AND ($1 = FALSE OR is_active)
            ORDER BY name
            "#
        ))
        .bind(active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list permissions: {error}")))?;

        Ok(rows.into_iter().map(Permission::from).collect())
    }

    async fn list_permissions_by_resource(&self, resource: &str) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(&format!(
            r#"
            SELECT {PERMISSION_COLUMNS}
            FROM permissions
            WHERE resource = $1 AND deleted_at IS NULL
            ORDER BY name
            "#
        ))
        .bind(resource)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list permissions for resource '{resource}': {error}"
            ))
        })?;

        Ok(rows.into_iter().map(Permission::from).collect())
    }
}
