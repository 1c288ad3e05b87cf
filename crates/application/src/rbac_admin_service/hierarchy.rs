use std::collections::HashMap;

use agrinova_domain::{RoleHierarchy, RoleHierarchyNode, RoleName, RoleRelationship};

use super::*;

impl RbacAdminService {
    /// Returns a snapshot of the active role hierarchy.
    pub async fn role_hierarchy(&self) -> AppResult<RoleHierarchy> {
        let roles = self.stores.roles.list_roles(true).await?;
        Ok(RoleHierarchy::new(roles))
    }

    /// Lists active roles at exactly `level`.
    pub async fn roles_at_level(&self, level: i32) -> AppResult<Vec<Role>> {
        Ok(self.role_hierarchy().await?.at_level(level))
    }

    /// Lists active roles within the inclusive level range.
    pub async fn roles_in_level_range(&self, min_level: i32, max_level: i32) -> AppResult<Vec<Role>> {
        if min_level > max_level {
            return Err(AppError::Validation(format!(
                "invalid level range {min_level}..={max_level}"
            )));
        }

        Ok(self
            .role_hierarchy()
            .await?
            .in_level_range(min_level, max_level))
    }

    /// Lists active roles with more authority than the given role.
    pub async fn roles_above(&self, role_id: RoleId) -> AppResult<Vec<Role>> {
        let role = self.require_role(role_id).await?;
        Ok(self.role_hierarchy().await?.above(role.level))
    }

    /// Lists active roles with less authority than the given role.
    pub async fn roles_below(&self, role_id: RoleId) -> AppResult<Vec<Role>> {
        let role = self.require_role(role_id).await?;
        Ok(self.role_hierarchy().await?.below(role.level))
    }

    /// Lists active roles at the nearest populated level above the given role.
    pub async fn direct_superiors(&self, role_id: RoleId) -> AppResult<Vec<Role>> {
        let role = self.require_role(role_id).await?;
        Ok(self.role_hierarchy().await?.direct_superiors(role.level))
    }

    /// Lists active roles at the nearest populated level below the given role.
    pub async fn direct_subordinates(&self, role_id: RoleId) -> AppResult<Vec<Role>> {
        let role = self.require_role(role_id).await?;
        Ok(self.role_hierarchy().await?.direct_subordinates(role.level))
    }

    /// Builds the hierarchy tree with each role's direct permission names.
    pub async fn role_hierarchy_tree(&self) -> AppResult<Vec<RoleHierarchyNode>> {
        let hierarchy = self.role_hierarchy().await?;

        let mut permissions = HashMap::new();
        for role in hierarchy.roles() {
            let names = self.role_permission_names(role.id).await?;
            permissions.insert(role.id, names);
        }

        Ok(hierarchy.tree(|role| permissions.get(&role.id).cloned().unwrap_or_default()))
    }

    /// Describes how two roles relate, by name.
    pub async fn role_relationship(
        &self,
        source_role: &str,
        target_role: &str,
    ) -> AppResult<RoleRelationship> {
        let source = self.find_role_named(source_role).await?;
        let target = self.find_role_named(target_role).await?;

        Ok(RoleRelationship::classify(
            source_role,
            source.as_ref(),
            target_role,
            target.as_ref(),
        ))
    }

    /// Returns whether the source role may manage the target role.
    pub async fn can_role_manage_role(&self, source_role: &str, target_role: &str) -> AppResult<bool> {
        Ok(self
            .role_relationship(source_role, target_role)
            .await?
            .can_manage)
    }

    async fn find_role_named(&self, name: &str) -> AppResult<Option<Role>> {
        match RoleName::new(name) {
            Ok(name) => self.stores.roles.find_role_by_name(&name).await,
            Err(_) => Ok(None),
        }
    }
}
