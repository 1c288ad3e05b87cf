//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod identifiers;
mod organization;
mod permission;
mod role;
mod role_hierarchy;
mod scope;
mod security;
mod user_override;

pub use identifiers::{BlockId, CompanyId, DivisionId, EstateId, OverrideId, PermissionId, RoleId};
pub use organization::{Block, Company, Division, Estate};
pub use permission::{
    Permission, RBAC_ADMIN_PERMISSION, RolePermissionEntry, effective_permission_names,
};
pub use role::{
    APEX_ROLE_LEVEL, RelationshipKind, Role, RoleName, RoleRelationship, can_manage, compare_roles,
};
pub use role_hierarchy::{RoleHierarchy, RoleHierarchyNode};
pub use scope::{PermissionScope, ScopeType};
pub use security::AuditAction;
pub use user_override::UserPermissionOverride;
