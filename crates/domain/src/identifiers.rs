use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID value.
            #[must_use]
            pub fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            /// Returns the underlying UUID value.
            #[must_use]
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }
    };
}

uuid_identifier!(
    /// Identifier of a role row.
    RoleId
);
uuid_identifier!(
    /// Identifier of a permission row.
    PermissionId
);
uuid_identifier!(
    /// Identifier of a per-user permission override.
    OverrideId
);
uuid_identifier!(
    /// Identifier of a company.
    CompanyId
);
uuid_identifier!(
    /// Identifier of an estate.
    EstateId
);
uuid_identifier!(
    /// Identifier of a division.
    DivisionId
);
uuid_identifier!(
    /// Identifier of a block.
    BlockId
);
