//! Domain records shared across the storage and engine layers.

pub mod identifiers;
pub mod object_tag;
pub mod tag;
pub mod taxonomy;

pub use identifiers::{ObjectTagId, TagId, TaxonomyId};
pub use object_tag::{Lineage, ObjectTag};
pub use tag::Tag;
pub use taxonomy::{Taxonomy, TaxonomyParams};

pub use crate::constants::{VARIANT_CLOSED, VARIANT_FREE_TEXT, VARIANT_LANGUAGE};
