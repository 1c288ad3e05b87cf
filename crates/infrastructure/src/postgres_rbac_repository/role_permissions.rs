use super::*;

impl PostgresRbacRepository {
    async fn ensure_role_exists(
        transaction: &mut Transaction<'_, Postgres>,
        role_id: RoleId,
    ) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM roles WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(role_id.as_uuid())
        .fetch_one(&mut **transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve role: {error}")))?;

        if !exists {
            return Err(AppError::NotFound(format!("role {role_id} not found")));
        }

        Ok(())
    }
}

#[async_trait]
impl RolePermissionRepository for PostgresRbacRepository {
    async fn assign_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<u64> {
        let mut transaction = self.begin().await?;
        Self::ensure_role_exists(&mut transaction, role_id).await?;

        let mut inserted = 0;
        for permission_id in permission_ids {
            inserted += sqlx::query(
                r#"
                INSERT INTO role_permissions (id, role_id, permission_id, inherited_from_role_id, is_denied)
                VALUES ($1, $2, $3, NULL, FALSE)
                ON CONFLICT (role_id, permission_id) WHERE inherited_from_role_id IS NULL
                DO NOTHING
                "#,
            )
            .bind(uuid::Uuid::new_v4())
            .bind(role_id.as_uuid())
            .bind(permission_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                map_missing_reference(
                    error,
                    || format!("permission {permission_id} not found"),
                    "failed to assign role permission",
                )
            })?
            .rows_affected();
        }

        commit(transaction).await?;
        Ok(inserted)
    }

    async fn deny_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<u64> {
        let mut transaction = self.begin().await?;
        Self::ensure_role_exists(&mut transaction, role_id).await?;

        let mut affected = 0;
        for permission_id in permission_ids {
            affected += sqlx::query(
                r#"
                INSERT INTO role_permissions (id, role_id, permission_id, inherited_from_role_id, is_denied)
                VALUES ($1, $2, $3, NULL, TRUE)
                ON CONFLICT (role_id, permission_id) WHERE inherited_from_role_id IS NULL
                DO UPDATE SET is_denied = TRUE
                "#,
            )
            .bind(uuid::Uuid::new_v4())
            .bind(role_id.as_uuid())
            .bind(permission_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                map_missing_reference(
                    error,
                    || format!("permission {permission_id} not found"),
                    "failed to deny role permission",
                )
            })?
            .rows_affected();
        }

        commit(transaction).await?;
        Ok(affected)
    }

    async fn inherit_permissions(
        &self,
        role_id: RoleId,
        source_role_id: RoleId,
    ) -> AppResult<u64> {
        let mut transaction = self.begin().await?;
        Self::ensure_role_exists(&mut transaction, role_id).await?;
        Self::ensure_role_exists(&mut transaction, source_role_id).await?;

        let source_grants = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            SELECT permission_id
            FROM role_permissions
            WHERE role_id = $1
                AND inherited_from_role_id IS NULL
                AND is_denied = FALSE
            ORDER BY created_at
            "#,
        )
        .bind(source_role_id.as_uuid())
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list source role grants: {error}"))
        })?;

        let mut inserted = 0;
        for permission_id in source_grants {
            inserted += sqlx::query(
                r#"
                INSERT INTO role_permissions (id, role_id, permission_id, inherited_from_role_id, is_denied)
                VALUES ($1, $2, $3, $4, FALSE)
                ON CONFLICT (role_id, permission_id, inherited_from_role_id)
                    WHERE inherited_from_role_id IS NOT NULL
                DO NOTHING
                "#,
            )
            .bind(uuid::Uuid::new_v4())
            .bind(role_id.as_uuid())
            .bind(permission_id)
            .bind(source_role_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to inherit role permission: {error}"))
            })?
            .rows_affected();
        }

        commit(transaction).await?;
        Ok(inserted)
    }

    async fn remove_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM role_permissions
            WHERE role_id = $1
                AND inherited_from_role_id IS NULL
                AND permission_id = ANY($2)
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(permission_uuids(permission_ids))
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to remove role permissions: {error}"))
        })?;

        Ok(result.rows_affected())
    }

    async fn list_role_permission_entries(
        &self,
        role_id: RoleId,
    ) -> AppResult<Vec<RolePermissionEntry>> {
        let rows = sqlx::query_as::<_, RolePermissionRow>(
            r#"
            SELECT
                grants.role_id,
                grants.inherited_from_role_id,
                grants.is_denied,
                grants.created_at AS granted_at,
                permissions.id,
                permissions.name,
                permissions.resource,
                permissions.action,
                permissions.description,
                permissions.is_active,
                permissions.created_at,
                permissions.updated_at
            FROM role_permissions AS grants
            INNER JOIN permissions
                ON permissions.id = grants.permission_id
            WHERE grants.role_id = $1
            ORDER BY permissions.name, grants.created_at
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list permissions of role {role_id}: {error}"))
        })?;

        Ok(rows.into_iter().map(RolePermissionEntry::from).collect())
    }
}
