use agrinova_core::{AppError, AppResult};
use agrinova_domain::{Permission, PermissionId, Role, RoleName};
use serde::Serialize;
use tracing::info;

use crate::RbacStores;
use crate::rbac_ports::{CreatePermissionInput, CreateRoleInput};

mod catalog;


use catalog::{APEX_ROLE, CORE_PERMISSIONS, ROLE_GRANTS, SYSTEM_ROLES};

/// Counts of rows created by one seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    /// Roles inserted.
    pub roles_created: u64,
    /// Permissions inserted.
    pub permissions_created: u64,
    /// Direct role grants inserted.
    pub grants_created: u64,
}

/// Seeds the system roles, the core permission catalog and default grants.
///
/// Seeding is idempotent: existing rows are kept and only missing rows are
/// inserted. The apex role is granted every catalog permission directly.
#[derive(Clone)]
pub struct RbacBootstrapService {
    stores: RbacStores,
}

impl RbacBootstrapService {
    /// Creates the bootstrap service.
    #[must_use]
    pub fn new(stores: RbacStores) -> Self {
        Self { stores }
    }

    /// Ensures the default RBAC data exists.
    pub async fn seed_defaults(&self) -> AppResult<BootstrapReport> {
        let mut report = BootstrapReport::default();

        for spec in SYSTEM_ROLES {
            let name = RoleName::new(spec.name)?;
            if self.stores.roles.find_role_by_name(&name).await?.is_some() {
                continue;
            }

            self.stores
                .roles
                .create_role(
                    name,
                    CreateRoleInput {
                        name: spec.name.to_owned(),
                        display_name: spec.display_name.to_owned(),
                        level: spec.level,
                        description: spec.description.to_owned(),
                        is_system: true,
                    },
                )
                .await?;
            report.roles_created += 1;
        }

        let mut catalog = Vec::with_capacity(CORE_PERMISSIONS.len());
        for (resource, action) in CORE_PERMISSIONS {
            let (permission, created) = self.ensure_permission(resource, action).await?;
            if created {
                report.permissions_created += 1;
            }
            catalog.push(permission);
        }

        let apex = self.role_named(APEX_ROLE).await?;
        let all_ids: Vec<PermissionId> = catalog.iter().map(|permission| permission.id).collect();
        report.grants_created += self
            .stores
            .role_permissions
            .assign_permissions(apex.id, &all_ids)
            .await?;

        for (role_name, permission_names) in ROLE_GRANTS {
            let role = self.role_named(role_name).await?;
            let ids = permission_names
                .iter()
                .map(|name| {
                    catalog
                        .iter()
                        .find(|permission| permission.name == *name)
                        .map(|permission| permission.id)
                        .ok_or_else(|| {
                            AppError::Internal(format!(
                                "default grant '{name}' for role {role_name} is not in the catalog"
                            ))
                        })
                })
                .collect::<AppResult<Vec<_>>>()?;

            report.grants_created += self
                .stores
                .role_permissions
                .assign_permissions(role.id, &ids)
                .await?;
        }

        info!(
            roles_created = report.roles_created,
            permissions_created = report.permissions_created,
            grants_created = report.grants_created,
            "rbac defaults seeded"
        );
        Ok(report)
    }

    async fn ensure_permission(&self, resource: &str, action: &str) -> AppResult<(Permission, bool)> {
        let name = Permission::compose_name(resource, action);
        if let Some(existing) = self
            .stores
            .permissions
            .find_permission_by_name(name.as_str())
            .await?
        {
            return Ok((existing, false));
        }

        let created = self
            .stores
            .permissions
            .create_permission(CreatePermissionInput {
                description: format!("{action} {resource}"),
                name,
                resource: resource.to_owned(),
                action: action.to_owned(),
            })
            .await?;
        Ok((created, true))
    }

    async fn role_named(&self, name: &str) -> AppResult<Role> {
        let name = RoleName::new(name)?;
        self.stores
            .roles
            .find_role_by_name(&name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{name}' not found")))
    }
}
