use std::fmt::{Display, Formatter};
use std::str::FromStr;

use agrinova_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{BlockId, CompanyId, DivisionId, EstateId};

/// Organisational resource kinds a permission can be scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeType {
    /// Company scope.
    Company,
    /// Estate scope.
    Estate,
    /// Division scope.
    Division,
    /// Block scope.
    Block,
}

impl ScopeType {
    /// Returns a stable storage value for this scope type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Estate => "estate",
            Self::Division => "division",
            Self::Block => "block",
        }
    }
}

impl FromStr for ScopeType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "company" => Ok(Self::Company),
            "estate" => Ok(Self::Estate),
            "division" => Ok(Self::Division),
            "block" => Ok(Self::Block),
            _ => Err(AppError::InvalidScope(format!(
                "unknown scope type '{value}'"
            ))),
        }
    }
}

impl Display for ScopeType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Resource instance narrowing where a permission or override applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionScope {
    /// Resource kind.
    pub scope_type: ScopeType,
    /// Resource instance id.
    pub scope_id: Uuid,
}

impl PermissionScope {
    /// Creates a scope from its parts.
    #[must_use]
    pub fn new(scope_type: ScopeType, scope_id: Uuid) -> Self {
        Self {
            scope_type,
            scope_id,
        }
    }

    /// Company scope.
    #[must_use]
    pub fn company(company_id: CompanyId) -> Self {
        Self::new(ScopeType::Company, company_id.as_uuid())
    }

    /// Estate scope.
    #[must_use]
    pub fn estate(estate_id: EstateId) -> Self {
        Self::new(ScopeType::Estate, estate_id.as_uuid())
    }

    /// Division scope.
    #[must_use]
    pub fn division(division_id: DivisionId) -> Self {
        Self::new(ScopeType::Division, division_id.as_uuid())
    }

    /// Block scope.
    #[must_use]
    pub fn block(block_id: BlockId) -> Self {
        Self::new(ScopeType::Block, block_id.as_uuid())
    }

    /// Parses a scope from transport parts.
    ///
    /// An empty type with no id is a blanket scope and yields `None`. A type
    /// without an id, or an id without a type, is rejected.
    pub fn parse(scope_type: &str, scope_id: Option<&str>) -> AppResult<Option<Self>> {
        let scope_id = scope_id.map(str::trim).filter(|value| !value.is_empty());
        match (scope_type.trim().is_empty(), scope_id) {
            (true, None) => Ok(None),
            (true, Some(_)) => Err(AppError::InvalidScope(
                "scope id requires a scope type".to_owned(),
            )),
            (false, None) => Err(AppError::InvalidScope(format!(
                "scope type '{scope_type}' requires a scope id"
            ))),
            (false, Some(scope_id)) => {
                let scope_type = ScopeType::from_str(scope_type)?;
                let scope_id = Uuid::parse_str(scope_id).map_err(|error| {
                    AppError::InvalidScope(format!("invalid scope id '{scope_id}': {error}"))
                })?;
                Ok(Some(Self::new(scope_type, scope_id)))
            }
        }
    }

    /// Rebuilds a scope from stored columns (`''` type means blanket).
    pub fn from_storage(scope_type: &str, scope_id: Option<Uuid>) -> AppResult<Option<Self>> {
        match (scope_type.is_empty(), scope_id) {
            (true, None) => Ok(None),
            (false, Some(scope_id)) => Ok(Some(Self::new(
                ScopeType::from_str(scope_type)?,
                scope_id,
            ))),
            _ => Err(AppError::InvalidScope(format!(
                "stored scope '{scope_type}' is inconsistent with its id"
            ))),
        }
    }
}

impl Display for PermissionScope {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}:{}", self.scope_type, self.scope_id)
    }
}
