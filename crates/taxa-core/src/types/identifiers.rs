//! Row-id based ID types for type-safe identifiers.
//!
//! Each ID type wraps an `i64` SQLite row id to prevent cross-type
//! confusion. A `TagId` cannot be accidentally used where a `TaxonomyId`
//! is expected.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Create a new ID from a row id.
            pub fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Get the inner row id.
            pub fn inner(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Taxonomy row identifier.
    TaxonomyId
);

define_id!(
    /// Tag row identifier.
    TagId
);

define_id!(
    /// Object-tag binding row identifier.
    ObjectTagId
);
