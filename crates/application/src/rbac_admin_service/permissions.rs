use agrinova_domain::{AuditAction, PermissionId};
use tracing::info;

use crate::rbac_ports::{CreatePermissionInput, UpdatePermissionInput};

use super::*;

impl RbacAdminService {
    /// Creates a permission and emits an audit event.
    ///
    /// An empty name is derived from resource and action.
    pub async fn create_permission(
        &self,
        actor: UserId,
        mut input: CreatePermissionInput,
    ) -> AppResult<Permission> {
        self.require_admin(actor).await?;

        input.resource = input.resource.trim().to_owned();
        input.action = input.action.trim().to_owned();
        if input.resource.is_empty() || input.action.is_empty() {
            return Err(AppError::Validation(
                "permission resource and action must not be empty".to_owned(),
            ));
        }
        input.name = match input.name.trim() {
            "" => Permission::compose_name(&input.resource, &input.action),
            name => name.to_owned(),
        };

        let permission = self.stores.permissions.create_permission(input).await?;
        self.append_audit(AuditEvent {
            actor,
            action: AuditAction::PermissionCreated,
            resource_type: "rbac_permission".to_owned(),
            resource_id: permission.id.to_string(),
            detail: Some(format!("created permission '{}'", permission.name)),
        })
        .await?;

        info!(permission = %permission.name, actor = %actor, "permission created");
        Ok(permission)
    }

    /// Updates a permission and emits an audit event.
    pub async fn update_permission(
        &self,
        actor: UserId,
        permission_id: PermissionId,
        input: UpdatePermissionInput,
    ) -> AppResult<Permission> {
        self.require_admin(actor).await?;

        let permission = self
            .stores
            .permissions
            .update_permission(permission_id, input)
            .await?;
        self.append_audit(AuditEvent {
            actor,
            action: AuditAction::PermissionUpdated,
            resource_type: "rbac_permission".to_owned(),
            resource_id: permission.id.to_string(),
            detail: Some(format!("updated permission '{}'", permission.name)),
        })
        .await?;

        Ok(permission)
    }

    /// Soft-deletes a permission and emits an audit event.
    pub async fn delete_permission(
        &self,
        actor: UserId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.require_admin(actor).await?;

        self.stores
            .permissions
            .soft_delete_permission(permission_id)
            .await?;
        self.append_audit(AuditEvent {
            actor,
            action: AuditAction::PermissionDeleted,
            resource_type: "rbac_permission".to_owned(),
            resource_id: permission_id.to_string(),
            detail: None,
        })
        .await
    }

    /// Fetches a permission by id.
    pub async fn get_permission(&self, permission_id: PermissionId) -> AppResult<Permission> {
        self.stores
            .permissions
            .find_permission_by_id(permission_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("permission {permission_id} not found")))
    }

    /// Fetches a permission by name.
    pub async fn get_permission_by_name(&self, name: &str) -> AppResult<Permission> {
        self.require_permission_named(name).await
    }

    /// Lists permissions ordered by name.
    pub async fn list_permissions(&self, active_only: bool) -> AppResult<Vec<Permission>> {
        self.stores.permissions.list_permissions(active_only).await
    }

    /// Lists permissions of one resource.
    pub async fn list_permissions_by_resource(&self, resource: &str) -> AppResult<Vec<Permission>> {
        self.stores
            .permissions
            .list_permissions_by_resource(resource.trim())
            .await
    }
}
