//! Identifier newtypes.
//!
//! Each entity gets its own UUID wrapper so a team id can never be passed
//! where a user id is expected. All of them serialize as plain UUID strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! define_id_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wrap an existing UUID.
            pub fn new(id: Uuid) -> Self {
                Self(id)
            }

            /// Generate a new random id.
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// The inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

define_id_type!(CompanyId, "Unique identifier for a company (tenant root).");
define_id_type!(TeamId, "Unique identifier for a team within a company.");
define_id_type!(UserId, "Unique identifier for a user.");
define_id_type!(RecordId, "Unique identifier for an owned record.");
