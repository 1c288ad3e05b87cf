use agrinova_core::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{OverrideId, PermissionId, PermissionScope};

/// Per-user grant or deny of one permission, independent of role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPermissionOverride {
    /// Stable override identifier.
    pub id: OverrideId,
    /// User the override applies to.
    pub user_id: UserId,
    /// Overridden permission.
    pub permission_id: PermissionId,
    /// Name of the overridden permission.
    pub permission_name: String,
    /// `true` grants, `false` denies.
    pub is_granted: bool,
    /// Optional resource instance the override is limited to.
    pub scope: Option<PermissionScope>,
    /// Expiry instant; `None` never expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// Audit note.
    pub reason: Option<String>,
    /// Administrator who created the override.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl UserPermissionOverride {
    /// Returns whether the override takes part in decisions at `now`.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expires_at| expires_at > now)
    }

    /// Returns whether the override is eligible for the expiry sweep at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at < now)
    }

    /// Returns whether the override matches a requested scope.
    ///
    /// Blanket overrides match any request. Scoped overrides match only a
    /// request with the same scope type and id.
    #[must_use]
    pub fn applies_to(&self, requested: Option<&PermissionScope>) -> bool {
        match &self.scope {
            None => true,
            Some(scope) => requested == Some(scope),
        }
    }

    /// Returns whether the override is limited to one resource instance.
    #[must_use]
    pub fn is_scoped(&self) -> bool {
        self.scope.is_some()
    }
}
