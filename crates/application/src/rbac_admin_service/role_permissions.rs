use std::collections::HashMap;

use agrinova_domain::{AuditAction, PermissionId, RolePermissionEntry};
use tracing::info;

use super::*;

/// Non-denied grant of a role with its source role attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePermissionGrant {
    /// Granted permission.
    pub permission: Permission,
    /// Role the grant was inherited from; `None` for direct grants.
    pub inherited_from: Option<Role>,
}

impl RbacAdminService {
    /// Grants permissions directly to a role. Existing direct rows are kept.
    pub async fn assign_role_permissions(
        &self,
        actor: UserId,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<u64> {
        self.require_admin(actor).await?;
        self.ensure_permissions_exist(permission_ids).await?;

        let inserted = self
            .stores
            .role_permissions
            .assign_permissions(role_id, permission_ids)
            .await?;
        self.append_role_permission_audit(
            actor,
            AuditAction::RolePermissionsAssigned,
            role_id,
            format!("assigned {inserted} of {} permissions", permission_ids.len()),
        )
        .await?;

        info!(role_id = %role_id, inserted, actor = %actor, "role permissions assigned");
        Ok(inserted)
    }

    /// Denies permissions within a role's direct grant set.
    pub async fn deny_role_permissions(
        &self,
        actor: UserId,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<u64> {
        self.require_admin(actor).await?;
        self.require_role(role_id).await?;
        self.ensure_permissions_exist(permission_ids).await?;

        let affected = self
            .stores
            .role_permissions
            .deny_permissions(role_id, permission_ids)
            .await?;
        self.append_role_permission_audit(
            actor,
            AuditAction::RolePermissionsDenied,
            role_id,
            format!("denied {affected} permissions"),
        )
        .await?;

        Ok(affected)
    }

    /// Copies the source role's direct grants into the role as inherited rows.
    pub async fn inherit_role_permissions(
        &self,
        actor: UserId,
        role_id: RoleId,
        source_role_id: RoleId,
    ) -> AppResult<u64> {
        self.require_admin(actor).await?;
        if role_id == source_role_id {
            return Err(AppError::Validation(
                "a role cannot inherit from itself".to_owned(),
            ));
        }
        self.require_role(role_id).await?;
        self.require_role(source_role_id).await?;

        let inserted = self
            .stores
            .role_permissions
            .inherit_permissions(role_id, source_role_id)
            .await?;
        self.append_role_permission_audit(
            actor,
            AuditAction::RolePermissionsInherited,
            role_id,
            format!("inherited {inserted} permissions from role {source_role_id}"),
        )
        .await?;

        Ok(inserted)
    }

    /// Removes direct associations. Inherited rows stay untouched.
    pub async fn remove_role_permissions(
        &self,
        actor: UserId,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<u64> {
        self.require_admin(actor).await?;

        let removed = self
            .stores
            .role_permissions
            .remove_permissions(role_id, permission_ids)
            .await?;
        self.append_role_permission_audit(
            actor,
            AuditAction::RolePermissionsRemoved,
            role_id,
            format!("removed {removed} direct permissions"),
        )
        .await?;

        Ok(removed)
    }

    /// Returns permissions granted directly and not denied.
    pub async fn role_direct_permissions(&self, role_id: RoleId) -> AppResult<Vec<Permission>> {
        let entries = self.role_entries(role_id).await?;
        Ok(entries
            .into_iter()
            .filter(|entry| entry.is_direct() && !entry.is_denied)
            .map(|entry| entry.permission)
            .collect())
    }

    /// Returns every non-denied grant with its source role.
    pub async fn role_permissions_with_inheritance(
        &self,
        role_id: RoleId,
    ) -> AppResult<Vec<RolePermissionGrant>> {
        let entries = self.role_entries(role_id).await?;

        let mut sources: HashMap<RoleId, Role> = HashMap::new();
        let mut grants = Vec::new();
        for entry in entries.into_iter().filter(|entry| !entry.is_denied) {
            let inherited_from = match entry.inherited_from_role_id {
                Some(source_id) => match sources.get(&source_id) {
                    Some(source) => Some(source.clone()),
                    None => {
                        let found = self.stores.roles.find_role_by_id(source_id).await?;
                        if let Some(source) = &found {
                            sources.insert(source_id, source.clone());
                        }
                        found
                    }
                },
                None => None,
            };
            grants.push(RolePermissionGrant {
                permission: entry.permission,
                inherited_from,
            });
        }

        Ok(grants)
    }

    /// Returns names of direct, non-denied grants.
    pub async fn role_permission_names(&self, role_id: RoleId) -> AppResult<Vec<String>> {
        let mut names: Vec<String> = self
            .role_direct_permissions(role_id)
            .await?
            .into_iter()
            .map(|permission| permission.name)
            .collect();
        names.sort();
        Ok(names)
    }

    async fn role_entries(&self, role_id: RoleId) -> AppResult<Vec<RolePermissionEntry>> {
        self.require_role(role_id).await?;
        self.stores
            .role_permissions
            .list_role_permission_entries(role_id)
            .await
    }

    async fn ensure_permissions_exist(&self, permission_ids: &[PermissionId]) -> AppResult<()> {
        for permission_id in permission_ids {
            if self
                .stores
                .permissions
                .find_permission_by_id(*permission_id)
                .await?
                .is_none()
            {
                return Err(AppError::NotFound(format!(
                    "permission {permission_id} not found"
                )));
            }
        }

        Ok(())
    }

    async fn append_role_permission_audit(
        &self,
        actor: UserId,
        action: AuditAction,
        role_id: RoleId,
        detail: String,
    ) -> AppResult<()> {
        self.append_audit(AuditEvent {
            actor,
            action,
            resource_type: "rbac_role_permission".to_owned(),
            resource_id: role_id.to_string(),
            detail: Some(detail),
        })
        .await
    }
}
