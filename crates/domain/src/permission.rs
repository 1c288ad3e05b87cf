use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{PermissionId, RoleId};

/// Permission required to administer roles, permissions and overrides.
pub const RBAC_ADMIN_PERMISSION: &str = "rbac:admin";

/// Named capability of the form `resource:action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Stable permission identifier.
    pub id: PermissionId,
    /// Unique permission name.
    pub name: String,
    /// Resource the permission applies to.
    pub resource: String,
    /// Action allowed on the resource.
    pub action: String,
    /// Free-text description.
    pub description: String,
    /// Inactive permissions are never granted.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Permission {
    /// Builds the conventional `resource:action` name.
    #[must_use]
    pub fn compose_name(resource: &str, action: &str) -> String {
        format!("{}:{}", resource.trim(), action.trim())
    }
}

/// Association between a role and a permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermissionEntry {
    /// Role owning the association.
    pub role_id: RoleId,
    /// Associated permission.
    pub permission: Permission,
    /// Source role when the row was materialised by inheritance.
    pub inherited_from_role_id: Option<RoleId>,
    /// Explicit denial inside the role's own grant set.
    pub is_denied: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl RolePermissionEntry {
    /// Returns whether the association was assigned directly.
    #[must_use]
    pub fn is_direct(&self) -> bool {
        self.inherited_from_role_id.is_none()
    }
}

/// Computes a role's effective permission names from its associations.
///
/// Active, non-denied rows (direct and inherited) form the grant set. Names
/// denied by a direct row are then removed, so a role can revoke a grant it
/// would otherwise inherit.
#[must_use]
pub fn effective_permission_names(entries: &[RolePermissionEntry]) -> BTreeSet<String> {
    let denied: BTreeSet<&str> = entries
        .iter()
        .filter(|entry| entry.is_denied && entry.is_direct())
        .map(|entry| entry.permission.name.as_str())
        .collect();

    entries
        .iter()
        .filter(|entry| !entry.is_denied && entry.permission.is_active)
        .map(|entry| entry.permission.name.as_str())
        .filter(|name| !denied.contains(name))
        .map(str::to_owned)
        .collect()
}
