mod audit;
mod overrides;
mod permissions;
mod repositories;
mod roles;
mod statistics;

pub use audit::AuditEvent;
pub use overrides::{AssignOverrideInput, NewUserOverride, OverrideRemoval, ScopeFilter};
pub use permissions::{CreatePermissionInput, UpdatePermissionInput};
pub use repositories::{
    AssignmentRepository, AuditRepository, OrganizationRepository, PermissionRepository,
    RbacStatisticsRepository, RolePermissionRepository, RoleRepository, UserDirectory,
    UserOverrideRepository,
};
pub use roles::{CreateRoleInput, UpdateRoleInput};
pub use statistics::RbacStats;
