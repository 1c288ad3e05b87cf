use super::*;

#[derive(Debug, FromRow)]
struct StatsRow {
    total_roles: i64,
    active_roles: i64,
    system_roles: i64,
    total_permissions: i64,
    active_permissions: i64,
    total_role_permissions: i64,
    total_user_overrides: i64,
    active_user_overrides: i64,
    expired_user_overrides: i64,
}

fn count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

#[async_trait]
impl RbacStatisticsRepository for PostgresRbacRepository {
    async fn rbac_statistics(&self, now: DateTime<Utc>) -> AppResult<RbacStats> {
        let row = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM roles WHERE deleted_at IS NULL) AS total_roles,
                (SELECT COUNT(*) FROM roles WHERE deleted_at IS NULL AND is_active) AS active_roles,
                (SELECT COUNT(*) FROM roles WHERE deleted_at IS NULL AND is_system) AS system_roles,
                (SELECT COUNT(*) FROM permissions WHERE deleted_at IS NULL) AS total_permissions,
                (SELECT COUNT(*) FROM permissions WHERE deleted_at IS NULL AND is_active) AS active_permissions,
                (SELECT COUNT(*) FROM role_permissions) AS total_role_permissions,
                (SELECT COUNT(*) FROM user_permission_assignments) AS total_user_overrides,
                (
                    SELECT COUNT(*)
                    FROM user_permission_assignments
                    WHERE expires_at IS NULL OR expires_at > $1
                ) AS active_user_overrides,
                (
                    SELECT COUNT(*)
                    FROM user_permission_assignments
                    WHERE expires_at < $1
                ) AS expired_user_overrides
            "#,
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to compute rbac statistics: {error}")))?;

        let total_roles = count(row.total_roles);
        let system_roles = count(row.system_roles);

        Ok(RbacStats {
            total_roles,
            active_roles: count(row.active_roles),
            system_roles,
            custom_roles: total_roles.saturating_sub(system_roles),
            total_permissions: count(row.total_permissions),
            active_permissions: count(row.active_permissions),
            total_role_permissions: count(row.total_role_permissions),
            total_user_overrides: count(row.total_user_overrides),
            active_user_overrides: count(row.active_user_overrides),
            expired_user_overrides: count(row.expired_user_overrides),
        })
    }
}
