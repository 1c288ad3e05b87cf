use super::*;

const ROLE_COLUMNS: &str = r#"
    id,
    name,
    display_name,
    level,
    description,
    is_active,
    is_system,
    created_at,
    updated_at
"#;

#[async_trait]
impl RoleRepository for PostgresRbacRepository {
    async fn create_role(&self, name: RoleName, input: CreateRoleInput) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(&format!(
            r#"
            INSERT INTO roles (id, name, display_name, level, description, is_system)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ROLE_COLUMNS}
            "#
        ))
        .bind(RoleId::new().as_uuid())
        .bind(name.as_str())
        .bind(input.display_name.as_str())
        .bind(input.level)
        .bind(input.description.as_str())
        .bind(input.is_system)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            map_unique_violation(
                error,
                || format!("role '{name}' already exists"),
                "failed to create role",
            )
        })?;

        row.into_role()
    }

    async fn update_role(&self, role_id: RoleId, input: UpdateRoleInput) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(&format!(
            r#"
            UPDATE roles
            SET
                display_name = COALESCE($2, display_name),
                description = COALESCE($3, description),
                is_active = COALESCE($4, is_active),
                updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {ROLE_COLUMNS}
            "#
        ))
        .bind(role_id.as_uuid())
        .bind(input.display_name)
        .bind(input.description)
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update role: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("role {role_id} not found")))?;

        row.into_role()
    }

    async fn soft_delete_role(&self, role_id: RoleId) -> AppResult<()> {
        let mut transaction = self.begin().await?;

        let (name, is_system) = sqlx::query_as::<_, (String, bool)>(
            r#"
            SELECT name, is_system
            FROM roles
            WHERE id = $1 AND deleted_at IS NULL
            FOR UPDATE
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve role: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("role {role_id} not found")))?;

        if is_system {
            return Err(AppError::SystemRoleProtected(format!(
                "role '{name}' is a system role"
            )));
        }

        sqlx::query(
            r#"
            UPDATE roles
            SET is_active = FALSE, deleted_at = now(), updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete role: {error}")))?;

        commit(transaction).await
    }

    async fn find_role_by_id(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(role_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role: {error}")))?
        .map(RoleRow::into_role)
        .transpose()
    }

    async fn find_role_by_name(&self, name: &RoleName) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles WHERE name = $1 AND deleted_at IS NULL"
        ))
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role '{name}': {error}")))?
        .map(RoleRow::into_role)
        .transpose()
    }

    async fn list_roles(&self, active_only: bool) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(&format!(
            r#"
            SELECT {ROLE_COLUMNS}
            FROM roles
            WHERE deleted_at IS NULL
                AND ($1 = FALSE OR is_active)
            ORDER BY level, name
            "#
        ))
        .bind(active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        collect_roles(rows)
    }
}
