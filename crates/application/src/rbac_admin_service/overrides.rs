use agrinova_domain::{
    AuditAction, BlockId, CompanyId, DivisionId, EstateId, PermissionScope, ScopeType,
    UserPermissionOverride,
};
use tracing::info;

use crate::rbac_ports::{AssignOverrideInput, NewUserOverride, OverrideRemoval, ScopeFilter};

use super::*;

impl RbacAdminService {
    /// Grants or denies one permission to one user, optionally scoped and
    /// time-bound.
    pub async fn assign_override(
        &self,
        actor: UserId,
        input: AssignOverrideInput,
    ) -> AppResult<UserPermissionOverride> {
        self.require_admin(actor).await?;

        let permission = self.require_permission_named(input.permission.as_str()).await?;
        if self.stores.users.find_user(input.user_id).await?.is_none() {
            return Err(AppError::NotFound(format!("user {} not found", input.user_id)));
        }
        if let Some(scope) = &input.scope {
            self.ensure_scope_exists(scope).await?;
        }
        if let Some(expires_at) = input.expires_at
            && expires_at <= self.clock.now()
        {
            return Err(AppError::Validation(format!(
                "override expiry {expires_at} must lie in the future"
            )));
        }

        let created = self
            .stores
            .overrides
            .create_override(NewUserOverride {
                user_id: input.user_id,
                permission_id: permission.id,
                is_granted: input.is_granted,
                scope: input.scope,
                expires_at: input.expires_at,
                reason: input.reason,
                created_by: actor,
            })
            .await?;

        let polarity = if created.is_granted { "granted" } else { "denied" };
        let scope = created
            .scope
            .map(|scope| scope.to_string())
            .unwrap_or_else(|| "all scopes".to_owned());
        self.append_audit(AuditEvent {
            actor,
            action: AuditAction::UserOverrideAssigned,
            resource_type: "rbac_user_override".to_owned(),
            resource_id: created.id.to_string(),
            detail: Some(format!(
                "{polarity} '{}' for user {} on {scope}",
                permission.name, created.user_id
            )),
        })
        .await?;

        info!(
            user_id = %created.user_id,
            permission = %permission.name,
            is_granted = created.is_granted,
            actor = %actor,
            "user override assigned"
        );
        Ok(created)
    }

    /// Removes a user's overrides for one permission, narrowed by scope.
    ///
    /// Removing nothing is not an error; the count is returned.
    pub async fn remove_override(
        &self,
        actor: UserId,
        user_id: UserId,
        permission: &str,
        scope: ScopeFilter,
    ) -> AppResult<u64> {
        self.require_admin(actor).await?;

        let permission = self.require_permission_named(permission).await?;
        let removed = self
            .stores
            .overrides
            .remove_overrides(OverrideRemoval {
                user_id,
                permission_id: permission.id,
                scope,
            })
            .await?;
        self.append_audit(AuditEvent {
            actor,
            action: AuditAction::UserOverrideRemoved,
            resource_type: "rbac_user_override".to_owned(),
            resource_id: format!("{user_id}:{}", permission.name),
            detail: Some(format!("removed {removed} overrides")),
        })
        .await?;

        Ok(removed)
    }

    /// Deletes every override of a user.
    pub async fn clear_overrides(&self, actor: UserId, user_id: UserId) -> AppResult<u64> {
        self.require_admin(actor).await?;

        let removed = self.stores.overrides.clear_overrides(user_id).await?;
        self.append_audit(AuditEvent {
            actor,
            action: AuditAction::UserOverridesCleared,
            resource_type: "rbac_user_override".to_owned(),
            resource_id: user_id.to_string(),
            detail: Some(format!("cleared {removed} overrides")),
        })
        .await?;

        info!(user_id = %user_id, removed, actor = %actor, "user overrides cleared");
        Ok(removed)
    }

    /// Lists every stored override of a user, expired ones included.
    pub async fn list_overrides(&self, user_id: UserId) -> AppResult<Vec<UserPermissionOverride>> {
        self.stores.overrides.list_overrides(user_id).await
    }

    /// Lists overrides of a user that have not expired.
    pub async fn list_active_overrides(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<UserPermissionOverride>> {
        self.stores
            .overrides
            .list_active_overrides(user_id, self.clock.now())
            .await
    }

    /// Deletes expired overrides across all users.
    pub async fn cleanup_expired_overrides(&self, actor: UserId) -> AppResult<u64> {
        self.require_admin(actor).await?;

        let removed = self
            .stores
            .overrides
            .cleanup_expired_overrides(self.clock.now())
            .await?;
        self.append_audit(AuditEvent {
            actor,
            action: AuditAction::UserOverridesPurged,
            resource_type: "rbac_user_override".to_owned(),
            resource_id: "expired".to_owned(),
            detail: Some(format!("purged {removed} expired overrides")),
        })
        .await?;

        Ok(removed)
    }

    async fn ensure_scope_exists(&self, scope: &PermissionScope) -> AppResult<()> {
        let exists = match scope.scope_type {
            ScopeType::Company => self
                .organization
                .find_company(CompanyId::from_uuid(scope.scope_id))
                .await?
                .is_some(),
            ScopeType::Estate => self
                .organization
                .find_estate(EstateId::from_uuid(scope.scope_id))
                .await?
                .is_some(),
            ScopeType::Division => self
                .organization
                .find_division(DivisionId::from_uuid(scope.scope_id))
                .await?
                .is_some(),
            ScopeType::Block => self
                .organization
                .find_block(BlockId::from_uuid(scope.scope_id))
                .await?
                .is_some(),
        };

        if exists {
            Ok(())
        } else {
            Err(AppError::InvalidScope(format!(
                "scope {scope} references a missing {}",
                scope.scope_type
            )))
        }
    }
}
