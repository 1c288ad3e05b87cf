//! Organisational containment records: Block ⊂ Division ⊂ Estate ⊂ Company.

use serde::{Deserialize, Serialize};

use crate::{BlockId, CompanyId, DivisionId, EstateId};

/// Company at the root of the containment chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Company id.
    pub id: CompanyId,
    /// Company name.
    pub name: String,
}

/// Estate owned by one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estate {
    /// Estate id.
    pub id: EstateId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Estate name.
    pub name: String,
}

/// Division inside one estate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Division {
    /// Division id.
    pub id: DivisionId,
    /// Owning estate.
    pub estate_id: EstateId,
    /// Denormalised company id, when the record carries one.
    pub company_id: Option<CompanyId>,
    /// Division name.
    pub name: String,
}

/// Block inside one division.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block id.
    pub id: BlockId,
    /// Owning division.
    pub division_id: DivisionId,
    /// Block name.
    pub name: String,
}
