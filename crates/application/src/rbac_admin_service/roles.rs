use agrinova_domain::{AuditAction, RoleName};
use tracing::info;

use crate::rbac_ports::{CreateRoleInput, UpdateRoleInput};

use super::*;

impl RbacAdminService {
    /// Creates a role and emits an audit event.
    pub async fn create_role(&self, actor: UserId, input: CreateRoleInput) -> AppResult<Role> {
        self.require_admin(actor).await?;

        let name = RoleName::new(input.name.as_str())?;
        if input.level < 1 {
            return Err(AppError::Validation(format!(
                "role level must be at least 1, got {}",
                input.level
            )));
        }

        let role = self.stores.roles.create_role(name, input).await?;
        self.append_audit(AuditEvent {
            actor,
            action: AuditAction::RoleCreated,
            resource_type: "rbac_role".to_owned(),
            resource_id: role.id.to_string(),
            detail: Some(format!("created role '{}' at level {}", role.name, role.level)),
        })
        .await?;

        info!(role = %role.name, level = role.level, actor = %actor, "role created");
        Ok(role)
    }

    /// Updates a role and emits an audit event.
    pub async fn update_role(
        &self,
        actor: UserId,
        role_id: RoleId,
        input: UpdateRoleInput,
    ) -> AppResult<Role> {
        self.require_admin(actor).await?;

        let role = self.stores.roles.update_role(role_id, input).await?;
        self.append_audit(AuditEvent {
            actor,
            action: AuditAction::RoleUpdated,
            resource_type: "rbac_role".to_owned(),
            resource_id: role.id.to_string(),
            detail: Some(format!("updated role '{}'", role.name)),
        })
        .await?;

        Ok(role)
    }

    /// Soft-deletes a non-system role and emits an audit event.
    pub async fn delete_role(&self, actor: UserId, role_id: RoleId) -> AppResult<()> {
        self.require_admin(actor).await?;

        self.stores.roles.soft_delete_role(role_id).await?;
        self.append_audit(AuditEvent {
            actor,
            action: AuditAction::RoleDeleted,
            resource_type: "rbac_role".to_owned(),
            resource_id: role_id.to_string(),
            detail: None,
        })
        .await?;

        info!(role_id = %role_id, actor = %actor, "role deleted");
        Ok(())
    }

    /// Fetches a role by id.
    pub async fn get_role(&self, role_id: RoleId) -> AppResult<Role> {
        self.require_role(role_id).await
    }

    /// Fetches a role by case-insensitive name.
    pub async fn get_role_by_name(&self, name: &str) -> AppResult<Role> {
        let name = RoleName::new(name)?;
        self.stores
            .roles
            .find_role_by_name(&name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{name}' not found")))
    }

    /// Lists roles in level order.
    pub async fn list_roles(&self, active_only: bool) -> AppResult<Vec<Role>> {
        self.stores.roles.list_roles(active_only).await
    }
}
