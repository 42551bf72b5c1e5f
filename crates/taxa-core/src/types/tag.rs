//! Tag record.

use serde::{Deserialize, Serialize};

use super::identifiers::{TagId, TaxonomyId};

/// One entry in a taxonomy's vocabulary.
///
/// Stored tags always carry an `id`. Model-backed variants synthesize
/// ephemeral tags from their external enumeration; those have `id: None`
/// and are keyed by `external_id` until tagging materializes a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Option<TagId>,
    pub taxonomy_id: TaxonomyId,
    /// Display string, unique among the siblings of one parent.
    pub value: String,
    /// Parent identifier only; lineage lookup is lookup-by-id, never a
    /// live back-reference, so deleting a subtree cannot dangle.
    pub parent_id: Option<TagId>,
    /// Stable key for model-backed taxonomies, independent of the row id.
    pub external_id: Option<String>,
}

impl Tag {
    /// An ephemeral tag synthesized from an external enumeration.
    pub fn ephemeral(
        taxonomy_id: TaxonomyId,
        value: impl Into<String>,
        external_id: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            taxonomy_id,
            value: value.into(),
            parent_id: None,
            external_id: Some(external_id.into()),
        }
    }
}
