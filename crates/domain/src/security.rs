use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by RBAC administration use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a role is created.
    RoleCreated,
    /// Emitted when a role is updated.
    RoleUpdated,
    /// Emitted when a role is soft-deleted.
    RoleDeleted,
    /// Emitted when a permission is created.
    PermissionCreated,
    /// Emitted when a permission is updated.
    PermissionUpdated,
    /// Emitted when a permission is soft-deleted.
    PermissionDeleted,
    /// Emitted when permissions are granted directly to a role.
    RolePermissionsAssigned,
    /// Emitted when permissions are explicitly denied on a role.
    RolePermissionsDenied,
    /// Emitted when a role inherits grants from another role.
    RolePermissionsInherited,
    /// Emitted when direct role permissions are removed.
    RolePermissionsRemoved,
    /// Emitted when a user override is created.
    UserOverrideAssigned,
    /// Emitted when user overrides are removed.
    UserOverrideRemoved,
    /// Emitted when every override of a user is cleared.
    UserOverridesCleared,
    /// Emitted when expired overrides are swept.
    UserOverridesPurged,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleCreated => "rbac.role.created",
            Self::RoleUpdated => "rbac.role.updated",
            Self::RoleDeleted => "rbac.role.deleted",
            Self::PermissionCreated => "rbac.permission.created",
            Self::PermissionUpdated => "rbac.permission.updated",
            Self::PermissionDeleted => "rbac.permission.deleted",
            Self::RolePermissionsAssigned => "rbac.role_permissions.assigned",
            Self::RolePermissionsDenied => "rbac.role_permissions.denied",
            Self::RolePermissionsInherited => "rbac.role_permissions.inherited",
            Self::RolePermissionsRemoved => "rbac.role_permissions.removed",
            Self::UserOverrideAssigned => "rbac.user_override.assigned",
            Self::UserOverrideRemoved => "rbac.user_override.removed",
            Self::UserOverridesCleared => "rbac.user_override.cleared",
            Self::UserOverridesPurged => "rbac.user_override.purged",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AuditAction;

    #[test]
    fn audit_actions_use_dotted_storage_values() {
        assert_eq!(AuditAction::RoleDeleted.as_str(), "rbac.role.deleted");
        assert_eq!(
            AuditAction::UserOverridesPurged.as_str(),
            "rbac.user_override.purged"
        );
    }
}
