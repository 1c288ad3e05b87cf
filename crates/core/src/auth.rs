use serde::{Deserialize, Serialize};

use crate::UserId;

/// User record resolved through the identity lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    user_id: UserId,
    role: String,
    is_active: bool,
}

impl UserIdentity {
    /// Creates an identity from the user id, role name and activation flag.
    #[must_use]
    pub fn new(user_id: UserId, role: impl Into<String>, is_active: bool) -> Self {
        Self {
            user_id,
            role: role.into(),
            is_active,
        }
    }

    /// Returns the stable user identifier.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the role name assigned to the user.
    #[must_use]
    pub fn role(&self) -> &str {
        self.role.as_str()
    }

    /// Returns whether the account is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }
}
