use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use agrinova_application::{
    CreatePermissionInput, CreateRoleInput, NewUserOverride, OverrideRemoval,
    PermissionRepository, RbacStatisticsRepository, RbacStats, RolePermissionRepository,
    RoleRepository, ScopeFilter, UpdatePermissionInput, UpdateRoleInput, UserOverrideRepository,
};
use agrinova_core::{AppError, AppResult, UserId};
use agrinova_domain::{
    OverrideId, Permission, PermissionId, PermissionScope, Role, RoleId, RoleName,
    RolePermissionEntry, UserPermissionOverride,
};

mod overrides;
mod permissions;
mod role_permissions;
mod roles;
mod statistics;

#[cfg(test)]
mod tests;

/// PostgreSQL-backed repository for roles, permissions, role grants and
/// user overrides.
#[derive(Clone)]
pub struct PostgresRbacRepository {
    pool: PgPool,
}

impl PostgresRbacRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> AppResult<Transaction<'_, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))
    }
}

async fn commit(transaction: Transaction<'_, Postgres>) -> AppResult<()> {
    transaction
        .commit()
        .await
        .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))
}

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

fn database_code(error: &sqlx::Error) -> Option<String> {
    match error {
        sqlx::Error::Database(database_error) => {
            database_error.code().map(|code| code.into_owned())
        }
        _ => None,
    }
}

fn map_unique_violation(error: sqlx::Error, conflict: impl FnOnce() -> String, context: &str) -> AppError {
    if database_code(&error).as_deref() == Some(UNIQUE_VIOLATION) {
        return AppError::AlreadyExists(conflict());
    }

    AppError::Internal(format!("{context}: {error}"))
}

fn map_missing_reference(error: sqlx::Error, missing: impl FnOnce() -> String, context: &str) -> AppError {
    if database_code(&error).as_deref() == Some(FOREIGN_KEY_VIOLATION) {
        return AppError::NotFound(missing());
    }

    AppError::Internal(format!("{context}: {error}"))
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: uuid::Uuid,
    name: String,
    display_name: String,
    level: i32,
    description: String,
    is_active: bool,
    is_system: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RoleRow {
    fn into_role(self) -> AppResult<Role> {
        Ok(Role {
            id: RoleId::from_uuid(self.id),
            name: RoleName::new(self.name.as_str()).map_err(|error| {
                AppError::Internal(format!("stored role '{}' is invalid: {error}", self.name))
            })?,
            display_name: self.display_name,
            level: self.level,
            description: self.description,
            is_active: self.is_active,
            is_system: self.is_system,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    id: uuid::Uuid,
    name: String,
    resource: String,
    action: String,
    description: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PermissionRow> for Permission {
    fn from(row: PermissionRow) -> Self {
        Self {
            id: PermissionId::from_uuid(row.id),
            name: row.name,
            resource: row.resource,
            action: row.action,
            description: row.description,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct RolePermissionRow {
    role_id: uuid::Uuid,
    inherited_from_role_id: Option<uuid::Uuid>,
    is_denied: bool,
    granted_at: DateTime<Utc>,
    #[sqlx(flatten)]
    permission: PermissionRow,
}

impl From<RolePermissionRow> for RolePermissionEntry {
    fn from(row: RolePermissionRow) -> Self {
        Self {
            role_id: RoleId::from_uuid(row.role_id),
            permission: row.permission.into(),
            inherited_from_role_id: row.inherited_from_role_id.map(RoleId::from_uuid),
            is_denied: row.is_denied,
            created_at: row.granted_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct OverrideRow {
    id: uuid::Uuid,
    user_id: uuid::Uuid,
    permission_id: uuid::Uuid,
    permission_name: String,
    is_granted: bool,
    scope_type: String,
    scope_id: Option<uuid::Uuid>,
    expires_at: Option<DateTime<Utc>>,
    reason: Option<String>,
    created_by: uuid::Uuid,
    created_at: DateTime<Utc>,
}

impl OverrideRow {
    fn into_override(self) -> AppResult<UserPermissionOverride> {
        Ok(UserPermissionOverride {
            id: OverrideId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            permission_id: PermissionId::from_uuid(self.permission_id),
            permission_name: self.permission_name,
            is_granted: self.is_granted,
            scope: PermissionScope::from_storage(self.scope_type.as_str(), self.scope_id)?,
            expires_at: self.expires_at,
            reason: self.reason,
            created_by: UserId::from_uuid(self.created_by),
            created_at: self.created_at,
        })
    }
}

fn collect_roles(rows: Vec<RoleRow>) -> AppResult<Vec<Role>> {
    rows.into_iter().map(RoleRow::into_role).collect()
}

fn collect_overrides(rows: Vec<OverrideRow>) -> AppResult<Vec<UserPermissionOverride>> {
    rows.into_iter().map(OverrideRow::into_override).collect()
}

fn permission_uuids(permission_ids: &[PermissionId]) -> Vec<uuid::Uuid> {
    permission_ids.iter().map(PermissionId::as_uuid).collect()
}
