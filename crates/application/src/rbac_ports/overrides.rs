use agrinova_core::UserId;
use agrinova_domain::{PermissionId, PermissionScope, ScopeType};
use chrono::{DateTime, Utc};

/// Storage payload for one new user override row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserOverride {
    /// User the override applies to.
    pub user_id: UserId,
    /// Overridden permission.
    pub permission_id: PermissionId,
    /// `true` grants, `false` denies.
    pub is_granted: bool,
    /// Optional resource instance the override is limited to.
    pub scope: Option<PermissionScope>,
    /// Expiry instant; `None` never expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// Audit note.
    pub reason: Option<String>,
    /// Administrator creating the override.
    pub created_by: UserId,
}

/// Administrative request to create a user override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignOverrideInput {
    /// User the override applies to.
    pub user_id: UserId,
    /// Permission name to grant or deny.
    pub permission: String,
    /// `true` grants, `false` denies.
    pub is_granted: bool,
    /// Optional resource instance the override is limited to.
    pub scope: Option<PermissionScope>,
    /// Expiry instant; must lie in the future when present.
    pub expires_at: Option<DateTime<Utc>>,
    /// Audit note.
    pub reason: Option<String>,
}

/// Scope narrowing applied when removing overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScopeFilter {
    /// Rows of every scope.
    #[default]
    Any,
    /// Only blanket rows.
    Blanket,
    /// Rows scoped to any instance of this type.
    Type(ScopeType),
    /// Rows scoped to exactly this instance.
    Exact(PermissionScope),
}

impl ScopeFilter {
    /// Builds a filter from optional transport parts.
    #[must_use]
    pub fn from_parts(scope_type: Option<ScopeType>, scope_id: Option<uuid::Uuid>) -> Self {
        match (scope_type, scope_id) {
            (Some(scope_type), Some(scope_id)) => {
                Self::Exact(PermissionScope::new(scope_type, scope_id))
            }
            (Some(scope_type), None) => Self::Type(scope_type),
            (None, _) => Self::Any,
        }
    }

    /// Returns whether a stored scope satisfies the filter.
    #[must_use]
    pub fn matches(&self, scope: Option<&PermissionScope>) -> bool {
        match self {
            Self::Any => true,
            Self::Blanket => scope.is_none(),
            Self::Type(scope_type) => scope.is_some_and(|scope| scope.scope_type == *scope_type),
            Self::Exact(expected) => scope == Some(expected),
        }
    }
}

/// Filter selecting override rows to delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverrideRemoval {
    /// User owning the rows.
    pub user_id: UserId,
    /// Overridden permission.
    pub permission_id: PermissionId,
    /// Scope narrowing.
    pub scope: ScopeFilter,
}
