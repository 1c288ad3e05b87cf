use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use agrinova_core::{AppError, AppResult, UserId};
use agrinova_domain::{OverrideId, PermissionScope, UserPermissionOverride};
use serde::Serialize;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::rbac_ports::{
    PermissionRepository, RolePermissionRepository, RoleRepository, UserDirectory,
    UserOverrideRepository,
};

mod batch;
mod roles;


pub use batch::{BatchPermissionCheckResult, PermissionCheck};

/// Deadline applied to store calls when the request carries none.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Reason reported whenever a decision fails closed.
pub const UNDETERMINED_REASON: &str = "authorization could not be determined";

/// Store dependencies of the authorization engine.
#[derive(Clone)]
pub struct RbacStores {
    /// Role hierarchy store.
    pub roles: Arc<dyn RoleRepository>,
    /// Permission catalog.
    pub permissions: Arc<dyn PermissionRepository>,
    /// Role-permission graph.
    pub role_permissions: Arc<dyn RolePermissionRepository>,
    /// User override store.
    pub overrides: Arc<dyn UserOverrideRepository>,
    /// Identity lookup.
    pub users: Arc<dyn UserDirectory>,
}

/// One authorization question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    /// Subject being checked.
    pub user_id: UserId,
    /// Requested permission name.
    pub permission: String,
    /// Optional resource instance the action targets.
    pub scope: Option<PermissionScope>,
    /// Deadline overriding the service default.
    pub timeout: Option<Duration>,
}

impl AuthorizationRequest {
    /// Creates an unscoped request.
    #[must_use]
    pub fn new(user_id: UserId, permission: impl Into<String>) -> Self {
        Self {
            user_id,
            permission: permission.into(),
            scope: None,
            timeout: None,
        }
    }

    /// Targets one resource instance.
    #[must_use]
    pub fn with_scope(mut self, scope: PermissionScope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Overrides the store deadline for this request.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Why a decision could not be determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UndeterminedCause {
    /// A store call exceeded its deadline.
    Timeout,
    /// User, role or permission lookup found nothing.
    LookupFailed,
    /// Any other store failure.
    StoreFailure,
}

impl UndeterminedCause {
    fn from_error(error: &AppError) -> Self {
        match error {
            AppError::Timeout(_) => Self::Timeout,
            AppError::NotFound(_) => Self::LookupFailed,
            _ => Self::StoreFailure,
        }
    }
}

/// Rule that produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionBasis {
    /// The user account is inactive.
    UserInactive,
    /// The permission is soft-deleted or disabled.
    PermissionInactive,
    /// A user-level deny override matched.
    UserDenyOverride,
    /// A user-level grant override matched.
    UserGrantOverride,
    /// The user's role is inactive.
    RoleInactive,
    /// The role's effective set contains the permission.
    RoleGrant,
    /// The role's effective set lacks the permission.
    RoleLacksPermission,
    /// Evaluation failed and the decision failed closed.
    Undetermined(UndeterminedCause),
}

/// Outcome of one authorization question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationDecision {
    /// Whether the action is allowed.
    pub allowed: bool,
    /// Human-readable explanation.
    pub reason: String,
    /// Rule that decided.
    pub basis: DecisionBasis,
    /// Override that decided, when one did.
    pub matched_override: Option<OverrideId>,
}

impl AuthorizationDecision {
    fn allow(reason: impl Into<String>, basis: DecisionBasis) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
            basis,
            matched_override: None,
        }
    }

    fn deny(reason: impl Into<String>, basis: DecisionBasis) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
            basis,
            matched_override: None,
        }
    }

    fn from_override(matched: &UserPermissionOverride) -> Self {
        let (allowed, reason, basis) = if matched.is_granted {
            (
                true,
                "explicitly granted for user",
                DecisionBasis::UserGrantOverride,
            )
        } else {
            (
                false,
                "explicitly denied for user",
                DecisionBasis::UserDenyOverride,
            )
        };

        Self {
            allowed,
            reason: reason.to_owned(),
            basis,
            matched_override: Some(matched.id),
        }
    }

    /// Fail-closed decision for an evaluation error.
    #[must_use]
    pub fn undetermined(error: &AppError) -> Self {
        Self::deny(
            UNDETERMINED_REASON,
            DecisionBasis::Undetermined(UndeterminedCause::from_error(error)),
        )
    }
}

/// Authorization engine combining overrides, role grants and denials.
#[derive(Clone)]
pub struct AuthorizationService {
    stores: RbacStores,
    clock: Arc<dyn Clock>,
    store_timeout: Duration,
}

impl AuthorizationService {
    /// Creates an engine over the given stores.
    #[must_use]
    pub fn new(stores: RbacStores, clock: Arc<dyn Clock>) -> Self {
        Self {
            stores,
            clock,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Replaces the default store deadline.
    #[must_use]
    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    /// Evaluates a request, surfacing lookup and store failures.
    pub async fn try_authorize(
        &self,
        request: &AuthorizationRequest,
    ) -> AppResult<AuthorizationDecision> {
        let decision = self
            .within_deadline(request.timeout, self.evaluate(request))
            .await?;

        debug!(
            user_id = %request.user_id,
            permission = %request.permission,
            allowed = decision.allowed,
            reason = %decision.reason,
            "authorization evaluated"
        );
        Ok(decision)
    }

    /// Evaluates a request, denying whenever the outcome cannot be determined.
    pub async fn authorize(&self, request: &AuthorizationRequest) -> AuthorizationDecision {
        match self.try_authorize(request).await {
            Ok(decision) => decision,
            Err(error) => {
                warn!(
                    user_id = %request.user_id,
                    permission = %request.permission,
                    error = %error,
                    "authorization failed closed"
                );
                AuthorizationDecision::undetermined(&error)
            }
        }
    }

    async fn within_deadline<T>(
        &self,
        timeout: Option<Duration>,
        operation: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        run_with_deadline(timeout.unwrap_or(self.store_timeout), operation).await
    }

    async fn evaluate(&self, request: &AuthorizationRequest) -> AppResult<AuthorizationDecision> {
        let user = self.require_user(request.user_id).await?;
        let permission = self
            .stores
            .permissions
            .find_permission_by_name(request.permission.as_str())
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("permission '{}' not found", request.permission))
            })?;

        if !user.is_active() {
            return Ok(AuthorizationDecision::deny(
                format!("user {} is inactive", request.user_id),
                DecisionBasis::UserInactive,
            ));
        }
        if !permission.is_active {
            return Ok(AuthorizationDecision::deny(
                format!("permission {} is inactive", permission.name),
                DecisionBasis::PermissionInactive,
            ));
        }

        let now = self.clock.now();
        let overrides = self
            .stores
            .overrides
            .list_active_overrides_for_permission(request.user_id, permission.id, now)
            .await?;
        let matching: Vec<&UserPermissionOverride> = overrides
            .iter()
            .filter(|candidate| {
                candidate.is_active_at(now) && candidate.applies_to(request.scope.as_ref())
            })
            .collect();

        let deny = most_specific(matching.iter().copied().filter(|value| !value.is_granted));
        if let Some(matched) = deny {
            return Ok(AuthorizationDecision::from_override(matched));
        }
        let grant = most_specific(matching.iter().copied().filter(|value| value.is_granted));
        if let Some(matched) = grant {
            return Ok(AuthorizationDecision::from_override(matched));
        }

        let role = self.role_of(&user).await?;
        if !role.is_active {
            return Ok(AuthorizationDecision::deny(
                format!("role {} is inactive", role.name),
                DecisionBasis::RoleInactive,
            ));
        }

        let effective = self.role_effective_set(&role).await?;
        if effective.contains(permission.name.as_str()) {
            Ok(AuthorizationDecision::allow(
                format!("granted via role {}", role.name),
                DecisionBasis::RoleGrant,
            ))
        } else {
            Ok(AuthorizationDecision::deny(
                format!("role {} lacks permission {}", role.name, permission.name),
                DecisionBasis::RoleLacksPermission,
            ))
        }
    }
}

/// Runs store work under `deadline`, reporting an elapsed deadline as `Timeout`.
pub(crate) async fn run_with_deadline<T>(
    deadline: Duration,
    operation: impl Future<Output = AppResult<T>>,
) -> AppResult<T> {
    tokio::time::timeout(deadline, operation)
        .await
        .map_err(|_| {
            AppError::Timeout(format!(
                "rbac store did not respond within {}ms",
                deadline.as_millis()
            ))
        })?
}

/// Picks the scoped override over a blanket one, then the newest row.
fn most_specific<'a>(
    candidates: impl Iterator<Item = &'a UserPermissionOverride>,
) -> Option<&'a UserPermissionOverride> {
    candidates.max_by(|left, right| {
        left.is_scoped()
            .cmp(&right.is_scoped())
            .then_with(|| left.created_at.cmp(&right.created_at))
            .then_with(|| left.id.cmp(&right.id))
    })
}
