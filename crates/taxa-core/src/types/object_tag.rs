//! Object-tag binding record.

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use super::identifiers::{ObjectTagId, TagId, TaxonomyId};

/// Ancestors-to-self value path. Tag trees are shallow, so the common case
/// stays on the stack.
pub type Lineage = SmallVec<[String; 4]>;

/// One binding of a value to an external content object within a taxonomy.
///
/// `value` and `name` are denormalized copies captured at write time and
/// never auto-synced from the referenced tag or taxonomy afterwards, so the
/// historical tagging record survives vocabulary drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectTag {
    pub id: ObjectTagId,
    /// Opaque external key, case-sensitive, not validated by this core.
    pub object_id: String,
    /// Nullable: a binding may outlive its taxonomy.
    pub taxonomy_id: Option<TaxonomyId>,
    /// Nullable, dangling-allowed: tag deletion severs the link only.
    pub tag_id: Option<TagId>,
    /// Tag value or free-text string at binding time.
    pub value: String,
    /// Taxonomy name at binding time.
    pub name: String,
    /// Input-sequence position within the binding's replace set.
    pub position: usize,
    /// True exactly when `tag_id` is set but the referenced tag row no
    /// longer exists. Computed by the query layer, never stored.
    pub is_deleted: bool,
}

impl ObjectTag {
    /// Single-element lineage fallback for bindings with no live tag.
    pub fn value_lineage(&self) -> Lineage {
        smallvec![self.value.clone()]
    }
}

impl std::fmt::Display for ObjectTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}={}", self.object_id, self.name, self.value)
    }
}
