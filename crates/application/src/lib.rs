//! Application services and ports.

#![forbid(unsafe_code)]

mod access_scope_service;
mod authorization_service;
mod clock;
mod override_cleanup_service;
mod rbac_admin_service;
mod rbac_bootstrap_service;
mod rbac_ports;

#[cfg(test)]
mod test_support;

pub use access_scope_service::{
    AccessScopeService, AccessScopeStores, AccessTier, ResolvedScope, ScopeAccessPolicy,
};
pub use authorization_service::{
    AuthorizationDecision, AuthorizationRequest, AuthorizationService, BatchPermissionCheckResult,
    DEFAULT_STORE_TIMEOUT, DecisionBasis, PermissionCheck, RbacStores, UNDETERMINED_REASON,
    UndeterminedCause,
};
pub use clock::{Clock, SystemClock};
pub use override_cleanup_service::OverrideCleanupService;
pub use rbac_admin_service::{RbacAdminService, RolePermissionGrant};
pub use rbac_bootstrap_service::{BootstrapReport, RbacBootstrapService};
pub use rbac_ports::{
    AssignOverrideInput, AssignmentRepository, AuditEvent, AuditRepository, CreatePermissionInput,
    CreateRoleInput, NewUserOverride, OrganizationRepository, OverrideRemoval,
    PermissionRepository, RbacStatisticsRepository, RbacStats, RolePermissionRepository,
    RoleRepository, ScopeFilter, UpdatePermissionInput, UpdateRoleInput, UserDirectory,
    UserOverrideRepository,
};
