//! Identity types for entities
//!
//! Every entity carries three distinct identities (see Invariants 1, 3, 4
//! of the entity model):
//!
//! - [`EcsId`]: identifies *this version* of an entity. Immutable once
//!   assigned; a new version gets a new `EcsId`.
//! - [`LiveId`]: identifies *this in-memory instance*. Changes whenever the
//!   entity is copied, even if the `EcsId` is unchanged.
//! - [`LineageId`]: identifies the logical entity across its entire version
//!   history. Stable across every `EcsId` a logical entity ever takes on.
//!
//! Keeping these as distinct newtypes (rather than three `Uuid` fields)
//! makes it a compile error to compare, say, a `LiveId` against an `EcsId`.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_newtype {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh, random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID (used when reconstructing from storage).
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// The underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
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

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

uuid_newtype!(
    EcsId,
    "Global identifier of one immutable version of an entity."
);
uuid_newtype!(
    LiveId,
    "Process-local identifier of one in-memory instance of an entity."
);
uuid_newtype!(
    LineageId,
    "Identifier shared by every version of one logical entity."
);
