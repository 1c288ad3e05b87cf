/// Input payload for creating roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Unique role name, normalised to upper case.
    pub name: String,
    /// Human-friendly name.
    pub display_name: String,
    /// Hierarchy level, 1 is the apex.
    pub level: i32,
    /// Free-text description.
    pub description: String,
    /// Marks a role that cannot be deleted.
    pub is_system: bool,
}

/// Partial update for an existing role.
///
/// The level is intentionally absent: it is stable once roles are seeded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRoleInput {
    /// New display name.
    pub display_name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New activation flag.
    pub is_active: Option<bool>,
}
