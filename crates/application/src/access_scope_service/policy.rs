use std::collections::HashMap;

use agrinova_core::AppResult;
use agrinova_domain::{Role, RoleName};

/// Reach of a role inside the organisational containment chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessTier {
    /// Every company and everything beneath it.
    Global,
    /// Assigned companies and everything beneath them.
    Company,
    /// Directly assigned estates and their divisions.
    Estate,
    /// Directly assigned divisions only.
    Division,
}

/// Data-driven mapping from role names to access tiers.
///
/// The apex role level is always global. Roles without an entry fall back to
/// the default tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeAccessPolicy {
    tiers: HashMap<RoleName, AccessTier>,
    default_tier: AccessTier,
}

impl ScopeAccessPolicy {
    /// Creates an empty policy with the given fallback tier.
    #[must_use]
    pub fn new(default_tier: AccessTier) -> Self {
        Self {
            tiers: HashMap::new(),
            default_tier,
        }
    }

    /// Maps one role name to a tier.
    pub fn with_role_tier(mut self, role: &str, tier: AccessTier) -> AppResult<Self> {
        self.tiers.insert(RoleName::new(role)?, tier);
        Ok(self)
    }

    /// Returns the tier of a role.
    #[must_use]
    pub fn tier_for(&self, role: &Role) -> AccessTier {
        if role.is_apex() {
            return AccessTier::Global;
        }

        self.tiers
            .get(&role.name)
            .copied()
            .unwrap_or(self.default_tier)
    }
}

impl Default for ScopeAccessPolicy {
    fn default() -> Self {
        let tiers = [
            ("COMPANY_ADMIN", AccessTier::Company),
            ("AREA_MANAGER", AccessTier::Company),
            ("MANAGER", AccessTier::Estate),
            ("ASISTEN", AccessTier::Division),
            ("MANDOR", AccessTier::Division),
        ]
        .into_iter()
        .filter_map(|(name, tier)| RoleName::new(name).ok().map(|name| (name, tier)))
        .collect();

        Self {
            tiers,
            default_tier: AccessTier::Company,
        }
    }
}
