use serde::Serialize;

/// Aggregate counts for operational dashboards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RbacStats {
    /// Roles not soft-deleted.
    pub total_roles: u64,
    /// Active roles.
    pub active_roles: u64,
    /// System roles.
    pub system_roles: u64,
    /// Non-system roles.
    pub custom_roles: u64,
    /// Permissions not soft-deleted.
    pub total_permissions: u64,
    /// Active permissions.
    pub active_permissions: u64,
    /// Role-permission associations.
    pub total_role_permissions: u64,
    /// Stored user overrides, expired ones included.
    pub total_user_overrides: u64,
    /// Overrides that never expire or expire in the future.
    pub active_user_overrides: u64,
    /// Overrides the expiry sweep would delete at the reported instant.
    pub expired_user_overrides: u64,
}
