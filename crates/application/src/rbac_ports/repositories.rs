use async_trait::async_trait;
use chrono::{DateTime, Utc};

use agrinova_core::{AppResult, UserId, UserIdentity};
use agrinova_domain::{
    Block, BlockId, Company, CompanyId, Division, DivisionId, Estate, EstateId, Permission, PermissionId,
    Role, RoleId, RoleName, RolePermissionEntry, UserPermissionOverride,
};

use super::audit::AuditEvent;
use super::overrides::{NewUserOverride, OverrideRemoval};
use super::permissions::{CreatePermissionInput, UpdatePermissionInput};
use super::roles::{CreateRoleInput, UpdateRoleInput};
use super::statistics::RbacStats;

/// Repository port for the role hierarchy store.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Creates a role. Fails with `AlreadyExists` when the name is taken.
    async fn create_role(&self, name: RoleName, input: CreateRoleInput) -> AppResult<Role>;

    /// Updates a role. Fails with `NotFound` when absent.
    async fn update_role(&self, role_id: RoleId, input: UpdateRoleInput) -> AppResult<Role>;

    /// Soft-deletes a role.
    ///
    /// Fails with `SystemRoleProtected` for system roles and `NotFound` when
    /// absent.
    async fn soft_delete_role(&self, role_id: RoleId) -> AppResult<()>;

    /// Finds a role by id.
    async fn find_role_by_id(&self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Finds a role by normalised name.
    async fn find_role_by_name(&self, name: &RoleName) -> AppResult<Option<Role>>;

    /// Lists roles ordered by level then name.
    async fn list_roles(&self, active_only: bool) -> AppResult<Vec<Role>>;
}

/// Repository port for the permission catalog.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Creates a permission. Fails with `AlreadyExists` on duplicate name.
    async fn create_permission(&self, input: CreatePermissionInput) -> AppResult<Permission>;

    /// Updates a permission. Fails with `NotFound` when absent.
    async fn update_permission(
        &self,
        permission_id: PermissionId,
        input: UpdatePermissionInput,
    ) -> AppResult<Permission>;

    /// Soft-deletes a permission. Fails with `NotFound` when absent.
    async fn soft_delete_permission(&self, permission_id: PermissionId) -> AppResult<()>;

    /// Finds a permission by id.
    async fn find_permission_by_id(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>>;

    /// Finds a permission by name.
    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>>;

    /// Lists permissions ordered by name.
    async fn list_permissions(&self, active_only: bool) -> AppResult<Vec<Permission>>;

    /// Lists permissions for one resource ordered by name.
    async fn list_permissions_by_resource(&self, resource: &str) -> AppResult<Vec<Permission>>;
}

/// Repository port for role-permission associations.
#[async_trait]
pub trait RolePermissionRepository: Send + Sync {
    /// Creates missing direct grants in one transaction.
    ///
    /// Existing direct rows are left untouched. Returns inserted row count and
    /// fails with `NotFound` when the role is absent.
    async fn assign_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<u64>;

    /// Marks direct rows as denied, creating them when missing.
    async fn deny_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<u64>;

    /// Materialises the source role's direct grants as inherited rows.
    async fn inherit_permissions(&self, role_id: RoleId, source_role_id: RoleId)
    -> AppResult<u64>;

    /// Deletes direct rows only. Inherited rows are untouched.
    async fn remove_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<u64>;

    /// Lists every association of the role whose permission still exists.
    async fn list_role_permission_entries(
        &self,
        role_id: RoleId,
    ) -> AppResult<Vec<RolePermissionEntry>>;
}

/// Repository port for per-user overrides.
#[async_trait]
pub trait UserOverrideRepository: Send + Sync {
    /// Inserts an override unconditionally.
    async fn create_override(&self, input: NewUserOverride) -> AppResult<UserPermissionOverride>;

    /// Deletes rows matching the filter and returns the count.
    async fn remove_overrides(&self, removal: OverrideRemoval) -> AppResult<u64>;

    /// Lists every stored override of a user, expired ones included.
    async fn list_overrides(&self, user_id: UserId) -> AppResult<Vec<UserPermissionOverride>>;

    /// Lists overrides with no expiry or an expiry after `now`.
    async fn list_active_overrides(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<UserPermissionOverride>>;

    /// Lists active overrides of a user for one permission.
    async fn list_active_overrides_for_permission(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<UserPermissionOverride>>;

    /// Deletes every override of a user.
    async fn clear_overrides(&self, user_id: UserId) -> AppResult<u64>;

    /// Deletes rows across all users whose expiry lies before `now`.
    async fn cleanup_expired_overrides(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// Identity lookup consumed by the engine.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds a user by id.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserIdentity>>;
}

/// Read port over the organisational containment chain.
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Finds a company by id.
    async fn find_company(&self, company_id: CompanyId) -> AppResult<Option<Company>>;

    /// Finds an estate by id.
    async fn find_estate(&self, estate_id: EstateId) -> AppResult<Option<Estate>>;

    /// Finds a division by id.
    async fn find_division(&self, division_id: DivisionId) -> AppResult<Option<Division>>;

    /// Finds a block by id.
    async fn find_block(&self, block_id: BlockId) -> AppResult<Option<Block>>;
}

/// Read port over user-to-organisation assignments.
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Returns whether the user is assigned to the company.
    async fn has_company_assignment(&self, user_id: UserId, company_id: CompanyId)
    -> AppResult<bool>;

    /// Returns whether the user holds an active direct estate assignment.
    async fn has_active_estate_assignment(
        &self,
        user_id: UserId,
        estate_id: EstateId,
    ) -> AppResult<bool>;

    /// Returns whether the user holds an active direct division assignment.
    async fn has_active_division_assignment(
        &self,
        user_id: UserId,
        division_id: DivisionId,
    ) -> AppResult<bool>;
}

/// Read port for aggregate RBAC counts.
#[async_trait]
pub trait RbacStatisticsRepository: Send + Sync {
    /// Computes counts, classifying override expiry against `now`.
    async fn rbac_statistics(&self, now: DateTime<Utc>) -> AppResult<RbacStats>;
}

/// Append-only audit sink.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Appends one event.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;
}
