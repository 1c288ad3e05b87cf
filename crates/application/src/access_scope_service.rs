use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use agrinova_core::{AppError, AppResult, UserId};
use agrinova_domain::{
    BlockId, CompanyId, DivisionId, EstateId, PermissionScope, Role, RoleName, ScopeType,
};
use tracing::debug;

use crate::authorization_service::{DEFAULT_STORE_TIMEOUT, run_with_deadline};
use crate::rbac_ports::{AssignmentRepository, OrganizationRepository, RoleRepository, UserDirectory};

mod policy;


pub use policy::{AccessTier, ScopeAccessPolicy};

/// Store dependencies of the scope access service.
#[derive(Clone)]
pub struct AccessScopeStores {
    /// Identity lookup.
    pub users: Arc<dyn UserDirectory>,
    /// Role hierarchy store.
    pub roles: Arc<dyn RoleRepository>,
    /// Organisational containment records.
    pub organization: Arc<dyn OrganizationRepository>,
    /// User-to-organisation assignments.
    pub assignments: Arc<dyn AssignmentRepository>,
}

/// Resource reference normalised up the containment chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedScope {
    /// Owning company.
    pub company_id: CompanyId,
    /// Owning estate, when the resource sits at or below estate level.
    pub estate_id: Option<EstateId>,
    /// Owning division, when the resource sits at or below division level.
    pub division_id: Option<DivisionId>,
    /// Block, when the resource is a block.
    pub block_id: Option<BlockId>,
}

/// Resolves resources to their owners and validates organisational access.
#[derive(Clone)]
pub struct AccessScopeService {
    stores: AccessScopeStores,
    policy: ScopeAccessPolicy,
    store_timeout: Duration,
}

impl AccessScopeService {
    /// Creates the service with the default tier policy.
    #[must_use]
    pub fn new(stores: AccessScopeStores) -> Self {
        Self {
            stores,
            policy: ScopeAccessPolicy::default(),
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Replaces the tier policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ScopeAccessPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the deadline applied to each resolution or access check.
    #[must_use]
    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    /// Resolves an estate to its company.
    pub async fn resolve_estate(&self, estate_id: EstateId) -> AppResult<ResolvedScope> {
        self.within_deadline(async {
            let estate = self
                .stores
                .organization
                .find_estate(estate_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("estate {estate_id} not found")))?;

            Ok(ResolvedScope {
                company_id: estate.company_id,
                estate_id: Some(estate.id),
                division_id: None,
                block_id: None,
            })
        })
        .await
    }

    /// Resolves a division to its estate and company.
    ///
    /// The denormalised company id on the division is used when present.
    pub async fn resolve_division(&self, division_id: DivisionId) -> AppResult<ResolvedScope> {
        self.within_deadline(async {
            let division = self
                .stores
                .organization
                .find_division(division_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("division {division_id} not found")))?;

            let company_id = match division.company_id {
                Some(company_id) => company_id,
                None => self.resolve_estate(division.estate_id).await?.company_id,
            };

            Ok(ResolvedScope {
                company_id,
                estate_id: Some(division.estate_id),
                division_id: Some(division.id),
                block_id: None,
            })
        })
        .await
    }

    /// Resolves a block through its division.
    pub async fn resolve_block(&self, block_id: BlockId) -> AppResult<ResolvedScope> {
        self.within_deadline(async {
            let block = self
                .stores
                .organization
                .find_block(block_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("block {block_id} not found")))?;

            let resolved = self.resolve_division(block.division_id).await?;
            Ok(ResolvedScope {
                block_id: Some(block.id),
                ..resolved
            })
        })
        .await
    }

    /// Resolves any permission scope.
    pub async fn resolve_scope(&self, scope: &PermissionScope) -> AppResult<ResolvedScope> {
        self.within_deadline(async {
            match scope.scope_type {
                ScopeType::Company => {
                    let company_id = CompanyId::from_uuid(scope.scope_id);
                    self.stores
                        .organization
                        .find_company(company_id)
                        .await?
                        .ok_or_else(|| AppError::NotFound(format!("company {company_id} not found")))?;

                    Ok(ResolvedScope {
                        company_id,
                        estate_id: None,
                        division_id: None,
                        block_id: None,
                    })
                }
                ScopeType::Estate => self.resolve_estate(EstateId::from_uuid(scope.scope_id)).await,
                ScopeType::Division => {
                    self.resolve_division(DivisionId::from_uuid(scope.scope_id))
                        .await
                }
                ScopeType::Block => self.resolve_block(BlockId::from_uuid(scope.scope_id)).await,
            }
        })
        .await
    }

    /// Validates company-level access. The root of every access chain.
    pub async fn validate_company_access(
        &self,
        user_id: UserId,
        company_id: CompanyId,
    ) -> AppResult<()> {
        self.within_deadline(async {
            let role = self.active_role_of(user_id).await?;
            if self.policy.tier_for(&role) == AccessTier::Global {
                return Ok(());
            }

            self.require_company_assignment(user_id, company_id).await
        })
        .await
    }

    /// Validates estate-level access.
    ///
    /// Company-tier roles pass through their company assignment. Estate-tier
    /// roles need a direct estate assignment.
    pub async fn validate_estate_access(&self, user_id: UserId, estate_id: EstateId) -> AppResult<()> {
        self.within_deadline(async {
            let role = self.active_role_of(user_id).await?;
            let resolved = self.resolve_estate(estate_id).await?;

            match self.policy.tier_for(&role) {
                AccessTier::Global => Ok(()),
                AccessTier::Estate => self.require_estate_assignment(user_id, estate_id).await,
                AccessTier::Company | AccessTier::Division => {
                    self.require_company_assignment(user_id, resolved.company_id)
                        .await
                }
            }
        })
        .await
    }

    /// Validates division-level access.
    ///
    /// Division-tier roles need a direct division assignment; containment is
    /// not enough for them.
    pub async fn validate_division_access(
        &self,
        user_id: UserId,
        division_id: DivisionId,
    ) -> AppResult<()> {
        self.within_deadline(async {
            let role = self.active_role_of(user_id).await?;
            let resolved = self.resolve_division(division_id).await?;

            match self.policy.tier_for(&role) {
                AccessTier::Global => Ok(()),
                AccessTier::Company => {
                    self.require_company_assignment(user_id, resolved.company_id)
                        .await
                }
                AccessTier::Estate => match resolved.estate_id {
                    Some(estate_id) => self.require_estate_assignment(user_id, estate_id).await,
                    None => Err(AppError::NotFound(format!(
                        "division {division_id} has no estate"
                    ))),
                },
                AccessTier::Division => {
                    if self
                        .stores
                        .assignments
                        .has_active_division_assignment(user_id, division_id)
                        .await?
                    {
                        Ok(())
                    } else {
                        Err(denied(user_id, "division", division_id))
                    }
                }
            }
        })
        .await
    }

    /// Validates block-level access through the owning division.
    pub async fn validate_block_access(&self, user_id: UserId, block_id: BlockId) -> AppResult<()> {
        self.within_deadline(async {
            let resolved = self.resolve_block(block_id).await?;
            match resolved.division_id {
                Some(division_id) => self.validate_division_access(user_id, division_id).await,
                None => Err(AppError::NotFound(format!("block {block_id} has no division"))),
            }
        })
        .await
    }

    async fn within_deadline<T>(
        &self,
        operation: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        run_with_deadline(self.store_timeout, operation).await
    }

    async fn active_role_of(&self, user_id: UserId) -> AppResult<Role> {
        let user = self
            .stores
            .users
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {user_id} not found")))?;
        if !user.is_active() {
            return Err(AppError::Forbidden(format!("user {user_id} is inactive")));
        }

        let role_name = RoleName::new(user.role())?;
        let role = self
            .stores
            .roles
            .find_role_by_name(&role_name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_name}' not found")))?;
        if !role.is_active {
            return Err(AppError::Forbidden(format!("role {role_name} is inactive")));
        }

        Ok(role)
    }

    async fn require_company_assignment(
        &self,
        user_id: UserId,
        company_id: CompanyId,
    ) -> AppResult<()> {
        if self
            .stores
            .assignments
            .has_company_assignment(user_id, company_id)
            .await?
        {
            return Ok(());
        }

        Err(denied(user_id, "company", company_id))
    }

    async fn require_estate_assignment(&self, user_id: UserId, estate_id: EstateId) -> AppResult<()> {
        if self
            .stores
            .assignments
            .has_active_estate_assignment(user_id, estate_id)
            .await?
        {
            return Ok(());
        }

        Err(denied(user_id, "estate", estate_id))
    }
}

fn denied(user_id: UserId, resource: &str, resource_id: impl std::fmt::Display) -> AppError {
    debug!(user_id = %user_id, resource, resource_id = %resource_id, "scope access denied");
    AppError::Forbidden(format!("access denied to {resource} {resource_id}"))
}
