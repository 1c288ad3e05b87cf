use std::sync::Arc;

use agrinova_core::{AppError, AppResult, UserId};
use agrinova_domain::{Permission, RBAC_ADMIN_PERMISSION, Role, RoleId};

use crate::AuthorizationService;
use crate::RbacStores;
use crate::clock::Clock;
use crate::rbac_ports::{
    AuditEvent, AuditRepository, OrganizationRepository, RbacStatisticsRepository,
};

mod hierarchy;
mod overrides;
mod permissions;
mod role_permissions;
mod roles;
mod statistics;


pub use role_permissions::RolePermissionGrant;

/// Administration of roles, permissions, role grants and user overrides.
///
/// Reads are open. Every mutation first evaluates the admin permission for the
/// acting user through the authorization engine and appends an audit event
/// once the store call succeeds.
#[derive(Clone)]
pub struct RbacAdminService {
    authorization: AuthorizationService,
    stores: RbacStores,
    organization: Arc<dyn OrganizationRepository>,
    statistics: Arc<dyn RbacStatisticsRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    clock: Arc<dyn Clock>,
    admin_permission: String,
}

impl RbacAdminService {
    /// Creates the administration service.
    #[must_use]
    pub fn new(
        authorization: AuthorizationService,
        stores: RbacStores,
        organization: Arc<dyn OrganizationRepository>,
        statistics: Arc<dyn RbacStatisticsRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            authorization,
            stores,
            organization,
            statistics,
            audit_repository,
            clock,
            admin_permission: RBAC_ADMIN_PERMISSION.to_owned(),
        }
    }

    /// Replaces the permission required for mutations.
    #[must_use]
    pub fn with_admin_permission(mut self, permission: impl Into<String>) -> Self {
        self.admin_permission = permission.into();
        self
    }

    async fn require_admin(&self, actor: UserId) -> AppResult<()> {
        self.authorization
            .require_permission(actor, self.admin_permission.as_str(), None)
            .await
    }

    async fn append_audit(&self, event: AuditEvent) -> AppResult<()> {
        self.audit_repository.append_event(event).await
    }

    async fn require_role(&self, role_id: RoleId) -> AppResult<Role> {
        self.stores
            .roles
            .find_role_by_id(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role {role_id} not found")))
    }

    async fn require_permission_named(&self, name: &str) -> AppResult<Permission> {
        self.stores
            .permissions
            .find_permission_by_name(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("permission '{name}' not found")))
    }
}
