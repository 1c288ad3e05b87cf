use agrinova_core::{AppError, AppResult, UserId};
use agrinova_domain::PermissionScope;

use super::*;

/// Decision for one permission of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionCheck {
    /// Checked permission name.
    pub permission: String,
    /// Fail-closed decision for the permission.
    pub decision: AuthorizationDecision,
}

/// Outcome of a batch permission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPermissionCheckResult {
    /// Whether the batch passed under the requested combinator.
    pub allowed: bool,
    /// Per-permission decisions in request order.
    pub checks: Vec<PermissionCheck>,
    /// Denied permissions, reported when every permission was required and the
    /// batch failed.
    pub failed_permissions: Vec<String>,
}

impl AuthorizationService {
    /// Returns whether the user holds the permission. Fails closed.
    pub async fn has_permission(
        &self,
        user_id: UserId,
        permission: &str,
        scope: Option<&PermissionScope>,
    ) -> bool {
        self.authorize(&request_for(user_id, permission, scope))
            .await
            .allowed
    }

    /// Returns whether the user holds every permission.
    pub async fn has_all_permissions(
        &self,
        user_id: UserId,
        permissions: &[&str],
        scope: Option<&PermissionScope>,
    ) -> bool {
        for permission in permissions {
            if !self.has_permission(user_id, permission, scope).await {
                return false;
            }
        }

        true
    }

    /// Returns whether the user holds at least one permission.
    pub async fn has_any_permission(
        &self,
        user_id: UserId,
        permissions: &[&str],
        scope: Option<&PermissionScope>,
    ) -> bool {
        for permission in permissions {
            if self.has_permission(user_id, permission, scope).await {
                return true;
            }
        }

        false
    }

    /// Evaluates every permission and reports which ones failed.
    pub async fn check_batch(
        &self,
        user_id: UserId,
        permissions: &[&str],
        scope: Option<&PermissionScope>,
        require_all: bool,
    ) -> BatchPermissionCheckResult {
        let mut checks = Vec::with_capacity(permissions.len());
        for permission in permissions {
            let decision = self
                .authorize(&request_for(user_id, permission, scope))
                .await;
            checks.push(PermissionCheck {
                permission: (*permission).to_owned(),
                decision,
            });
        }

        let allowed = if require_all {
            checks.iter().all(|check| check.decision.allowed)
        } else {
            checks.iter().any(|check| check.decision.allowed)
        };
        let failed_permissions = if require_all && !allowed {
            checks
                .iter()
                .filter(|check| !check.decision.allowed)
                .map(|check| check.permission.clone())
                .collect()
        } else {
            Vec::new()
        };

        BatchPermissionCheckResult {
            allowed,
            checks,
            failed_permissions,
        }
    }

    /// Ensures the user holds the permission, mapping a denial to `Forbidden`.
    ///
    /// Evaluation errors are returned unchanged, so an elapsed deadline stays
    /// `Timeout` instead of reading as a denial.
    pub async fn require_permission(
        &self,
        user_id: UserId,
        permission: &str,
        scope: Option<&PermissionScope>,
    ) -> AppResult<()> {
        let decision = self
            .try_authorize(&request_for(user_id, permission, scope))
            .await?;
        if decision.allowed {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user {user_id} is missing permission '{permission}': {}",
            decision.reason
        )))
    }
}

fn request_for(
    user_id: UserId,
    permission: &str,
    scope: Option<&PermissionScope>,
) -> AuthorizationRequest {
    let request = AuthorizationRequest::new(user_id, permission);
    match scope {
        Some(scope) => request.with_scope(*scope),
        None => request,
    }
}
