/// Input payload for creating permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePermissionInput {
    /// Unique permission name, conventionally `resource:action`.
    pub name: String,
    /// Resource the permission applies to.
    pub resource: String,
    /// Action allowed on the resource.
    pub action: String,
    /// Free-text description.
    pub description: String,
}

/// Partial update for an existing permission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePermissionInput {
    /// New description.
    pub description: Option<String>,
    /// New activation flag.
    pub is_active: Option<bool>,
}
