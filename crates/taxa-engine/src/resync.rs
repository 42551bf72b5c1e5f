//! The resync reconciler.
//!
//! Repairs bindings whose tag link dangles by re-resolving the stored
//! display value through the binding's taxonomy variant. Repair is a link
//! operation only — the denormalized value is never rewritten — and it is
//! monotonic: only dangling links are touched, so a reader racing a resync
//! pass never observes a valid binding turn invalid.

use taxa_core::errors::TaggingError;
use taxa_core::types::ObjectTagId;
use taxa_storage::queries::{object_tags, taxonomies};

use crate::TaggingEngine;

impl TaggingEngine {
    /// Repair dangling bindings whose tag has reappeared. Returns the
    /// number of bindings re-linked. With no repairable bindings this
    /// makes no writes and returns 0. Safe to run repeatedly and
    /// concurrently with tagging.
    pub fn resync_object_tags(
        &self,
        object_tag_ids: Option<&[ObjectTagId]>,
    ) -> Result<usize, TaggingError> {
        self.db().with_writer(|conn| {
            let candidates = object_tags::list_dangling(conn, object_tag_ids)?;
            if candidates.is_empty() {
                return Ok(0);
            }

            let mut repaired = 0;
            for binding in &candidates {
                // A binding that outlived its taxonomy has nothing to
                // resolve against; it stays deleted.
                let Some(taxonomy_id) = binding.taxonomy_id else {
                    continue;
                };
                let Some(taxonomy) = taxonomies::get_taxonomy(conn, taxonomy_id)? else {
                    continue;
                };
                let variant = self.registry().cast(&taxonomy)?;

                // Re-resolve the stored value: closed vocabularies re-find
                // by value, model-backed variants re-materialize by their
                // stable external id. A value that never reappeared is not
                // an error — the binding just stays deleted. Store failures
                // still propagate.
                let tag = match variant.materialize(conn, &taxonomy, &binding.value) {
                    Ok(tag) => tag,
                    Err(TaggingError::TagDoesNotExist { .. }) => continue,
                    Err(e) => return Err(e),
                };
                let Some(tag_id) = tag.id else {
                    continue;
                };

                if object_tags::relink_object_tag(conn, binding.id, tag_id)? {
                    repaired += 1;
                }
            }

            if repaired > 0 {
                tracing::info!(repaired, "resynced object tags");
            }
            Ok(repaired)
        })
    }
}
