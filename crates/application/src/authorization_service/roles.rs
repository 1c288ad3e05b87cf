use std::collections::BTreeSet;

use agrinova_core::UserIdentity;
use agrinova_domain::{Role, RoleId, RoleName, effective_permission_names};

use super::*;

impl AuthorizationService {
    /// Returns whether the user's role may manage holders of `target_role_name`.
    ///
    /// Inactive users and missing or inactive target roles yield `false`.
    pub async fn can_manage_role(&self, user_id: UserId, target_role_name: &str) -> AppResult<bool> {
        self.within_deadline(None, async {
            let user = self.require_user(user_id).await?;
            if !user.is_active() {
                return Ok(false);
            }

            let source = self.role_of(&user).await?;
            let target = match RoleName::new(target_role_name) {
                Ok(name) => self.stores.roles.find_role_by_name(&name).await?,
                Err(_) => None,
            };

            Ok(target.is_some_and(|target| target.is_active && source.can_manage(&target)))
        })
        .await
    }

    /// Returns the sorted effective permission names of a role.
    ///
    /// An inactive role has an empty effective set.
    pub async fn effective_permissions(&self, role_id: RoleId) -> AppResult<Vec<String>> {
        self.within_deadline(None, async {
            let role = self
                .stores
                .roles
                .find_role_by_id(role_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("role {role_id} not found")))?;

            Ok(self.role_effective_set(&role).await?.into_iter().collect())
        })
        .await
    }

    /// Returns the sorted permission names a user currently holds without scope.
    ///
    /// The role's effective set is extended by active blanket grants and
    /// reduced by active blanket denials. Scoped overrides only apply to
    /// requests naming their resource, so they are not listed.
    pub async fn user_permissions(&self, user_id: UserId) -> AppResult<Vec<String>> {
        self.within_deadline(None, async {
            let user = self.require_user(user_id).await?;
            if !user.is_active() {
                return Ok(Vec::new());
            }

            let role = self.role_of(&user).await?;
            let mut names = self.role_effective_set(&role).await?;

            let now = self.clock.now();
            let overrides = self
                .stores
                .overrides
                .list_active_overrides(user_id, now)
                .await?;
            let blanket = overrides
                .iter()
                .filter(|value| value.is_active_at(now) && !value.is_scoped());

            let mut denied = BTreeSet::new();
            for value in blanket {
                if value.is_granted {
                    names.insert(value.permission_name.clone());
                } else {
                    denied.insert(value.permission_name.clone());
                }
            }
            names.retain(|name| !denied.contains(name));

            let active: BTreeSet<String> = self
                .stores
                .permissions
                .list_permissions(true)
                .await?
                .into_iter()
                .map(|permission| permission.name)
                .collect();
            names.retain(|name| active.contains(name));

            Ok(names.into_iter().collect())
        })
        .await
    }

    pub(super) async fn require_user(&self, user_id: UserId) -> AppResult<UserIdentity> {
        self.stores
            .users
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {user_id} not found")))
    }

    pub(super) async fn role_of(&self, user: &UserIdentity) -> AppResult<Role> {
        let role_name = RoleName::new(user.role())?;
        self.stores
            .roles
            .find_role_by_name(&role_name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_name}' not found")))
    }

    pub(super) async fn role_effective_set(&self, role: &Role) -> AppResult<BTreeSet<String>> {
        if !role.is_active {
            return Ok(BTreeSet::new());
        }

        let entries = self
            .stores
            .role_permissions
            .list_role_permission_entries(role.id)
            .await?;
        Ok(effective_permission_names(&entries))
    }
}
