use std::fmt::{Display, Formatter};

use agrinova_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::RoleId;

/// Level held by the apex role. Lower levels carry more authority.
pub const APEX_ROLE_LEVEL: i32 = 1;

/// Normalised role name.
///
/// Names are trimmed and upper-cased so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleName(String);

impl RoleName {
    /// Creates a normalised role name.
    pub fn new(value: impl AsRef<str>) -> AppResult<Self> {
        let normalised = value.as_ref().trim().to_uppercase();
        if normalised.is_empty() {
            return Err(AppError::Validation(
                "role name must not be empty".to_owned(),
            ));
        }
        if normalised.chars().any(char::is_whitespace) {
            return Err(AppError::Validation(format!(
                "role name '{normalised}' must not contain whitespace"
            )));
        }

        Ok(Self(normalised))
    }

    /// Returns the normalised name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for RoleName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Named authority level assignable to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Stable role identifier.
    pub id: RoleId,
    /// Unique role name.
    pub name: RoleName,
    /// Human-friendly name.
    pub display_name: String,
    /// Hierarchy level, 1 is the apex.
    pub level: i32,
    /// Free-text description.
    pub description: String,
    /// Inactive roles grant nothing and manage nobody.
    pub is_active: bool,
    /// System roles cannot be deleted.
    pub is_system: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Returns whether this role sits at the apex level.
    #[must_use]
    pub fn is_apex(&self) -> bool {
        self.level == APEX_ROLE_LEVEL
    }

    /// Returns whether this role may manage users holding `target`.
    ///
    /// Management requires an active source role with strictly higher
    /// authority. Peers never manage each other.
    #[must_use]
    pub fn can_manage(&self, target: &Role) -> bool {
        self.is_active && self.level < target.level
    }
}

/// Relationship classes between two roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    /// Source has higher authority than target.
    Superior,
    /// Source has lower authority than target.
    Subordinate,
    /// Both roles share a level.
    Equal,
    /// One of the roles is inactive or missing.
    Unrelated,
}

impl RelationshipKind {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Superior => "superior",
            Self::Subordinate => "subordinate",
            Self::Equal => "equal",
            Self::Unrelated => "unrelated",
        }
    }
}

/// Classifies two active roles by their signed level difference.
#[must_use]
pub fn compare_roles(source: &Role, target: &Role) -> RelationshipKind {
    if !source.is_active || !target.is_active {
        return RelationshipKind::Unrelated;
    }

    match source.level.cmp(&target.level) {
        std::cmp::Ordering::Less => RelationshipKind::Superior,
        std::cmp::Ordering::Greater => RelationshipKind::Subordinate,
        std::cmp::Ordering::Equal => RelationshipKind::Equal,
    }
}

/// Returns whether `source` may manage users holding `target`.
#[must_use]
pub fn can_manage(source: &Role, target: &Role) -> bool {
    source.can_manage(target)
}

/// Describes how a source role relates to a target role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRelationship {
    /// Source role name as requested.
    pub source_role: String,
    /// Target role name as requested.
    pub target_role: String,
    /// Whether the source may manage the target.
    pub can_manage: bool,
    /// Signed `source.level - target.level`.
    pub level_difference: i32,
    /// Relationship class.
    pub relationship: RelationshipKind,
}

impl RoleRelationship {
    /// Classifies two optional roles.
    ///
    /// Missing or inactive roles yield [`RelationshipKind::Unrelated`].
    #[must_use]
    pub fn classify(
        source_name: &str,
        source: Option<&Role>,
        target_name: &str,
        target: Option<&Role>,
    ) -> Self {
        let (source, target) = match (source, target) {
            (Some(source), Some(target)) if source.is_active && target.is_active => {
                (source, target)
            }
            _ => {
                return Self {
                    source_role: source_name.to_owned(),
                    target_role: target_name.to_owned(),
                    can_manage: false,
                    level_difference: 0,
                    relationship: RelationshipKind::Unrelated,
                };
            }
        };

        Self {
            source_role: source_name.to_owned(),
            target_role: target_name.to_owned(),
            can_manage: can_manage(source, target),
            level_difference: source.level - target.level,
            relationship: compare_roles(source, target),
        }
    }
}
