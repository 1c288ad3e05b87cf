use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::Role;

/// Sorted snapshot of active roles used for level-based queries.
///
/// Roles are ordered by level, then by name. Several roles may share a level,
/// so "direct" superiors and subordinates are sets of peers rather than single
/// roles, computed against the distinct levels present in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleHierarchy {
    roles: Vec<Role>,
}

/// One node of the role hierarchy tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleHierarchyNode {
    /// Role at this node.
    pub role: Role,
    /// Direct, non-denied permission names of the role.
    pub permissions: Vec<String>,
    /// Roles at the next populated level.
    pub children: Vec<RoleHierarchyNode>,
}

impl RoleHierarchy {
    /// Builds a hierarchy from roles, ignoring inactive ones.
    #[must_use]
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        let mut roles: Vec<Role> = roles.into_iter().filter(|role| role.is_active).collect();
        roles.sort_by(|left, right| {
            left.level
                .cmp(&right.level)
                .then_with(|| left.name.cmp(&right.name))
        });

        Self { roles }
    }

    /// Returns every active role in level order.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        self.roles.as_slice()
    }

    /// Returns the distinct populated levels in ascending order.
    #[must_use]
    pub fn levels(&self) -> Vec<i32> {
        self.roles
            .iter()
            .map(|role| role.level)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Returns roles at exactly `level`.
    #[must_use]
    pub fn at_level(&self, level: i32) -> Vec<Role> {
        self.filtered(|role| role.level == level)
    }

    /// Returns roles within the inclusive level range.
    #[must_use]
    pub fn in_level_range(&self, min_level: i32, max_level: i32) -> Vec<Role> {
        self.filtered(|role| role.level >= min_level && role.level <= max_level)
    }

    /// Returns roles with more authority than `level`.
    #[must_use]
    pub fn above(&self, level: i32) -> Vec<Role> {
        self.filtered(|role| role.level < level)
    }

    /// Returns roles with less authority than `level`.
    #[must_use]
    pub fn below(&self, level: i32) -> Vec<Role> {
        self.filtered(|role| role.level > level)
    }

    /// Returns the roles at the closest populated level above `level`.
    #[must_use]
    pub fn direct_superiors(&self, level: i32) -> Vec<Role> {
        self.levels()
            .into_iter()
            .filter(|candidate| *candidate < level)
            .max()
            .map(|superior_level| self.at_level(superior_level))
            .unwrap_or_default()
    }

    /// Returns the roles at the closest populated level below `level`.
    #[must_use]
    pub fn direct_subordinates(&self, level: i32) -> Vec<Role> {
        self.levels()
            .into_iter()
            .find(|candidate| *candidate > level)
            .map(|subordinate_level| self.at_level(subordinate_level))
            .unwrap_or_default()
    }

    /// Builds the hierarchy tree rooted at the most senior level.
    ///
    /// Each node lists every role of the next populated level as children.
    #[must_use]
    pub fn tree<F>(&self, permissions_for: F) -> Vec<RoleHierarchyNode>
    where
        F: Fn(&Role) -> Vec<String>,
    {
        let levels = self.levels();
        let Some(top_level) = levels.first() else {
            return Vec::new();
        };

        self.at_level(*top_level)
            .into_iter()
            .map(|role| self.build_node(role, &levels, &permissions_for))
            .collect()
    }

    fn build_node<F>(&self, role: Role, levels: &[i32], permissions_for: &F) -> RoleHierarchyNode
    where
        F: Fn(&Role) -> Vec<String>,
    {
        let children = levels
            .iter()
            .find(|candidate| **candidate > role.level)
            .map(|next_level| {
                self.at_level(*next_level)
                    .into_iter()
                    .map(|child| self.build_node(child, levels, permissions_for))
                    .collect()
            })
            .unwrap_or_default();

        RoleHierarchyNode {
            permissions: permissions_for(&role),
            role,
            children,
        }
    }

    fn filtered(&self, predicate: impl Fn(&Role) -> bool) -> Vec<Role> {
        self.roles
            .iter()
            .filter(|role| predicate(role))
            .cloned()
            .collect()
    }
}
