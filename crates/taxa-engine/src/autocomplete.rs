//! Autocomplete over taxonomy vocabularies and historical values.
//!
//! Closed taxonomies complete against their own tag values; free-text
//! taxonomies complete against the distinct values ever bound under them.
//! Results are deduplicated by value (first occurrence wins), sorted by
//! value, and each entry carries the resolvable tag id when one exists.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use taxa_core::errors::TaggingError;
use taxa_core::types::{TagId, Taxonomy};
use taxa_storage::queries::{object_tags, tags};

use crate::TaggingEngine;

/// One autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteEntry {
    pub value: String,
    /// The resolvable tag identity for closed vocabularies; None for
    /// free-text suggestions.
    pub tag_id: Option<TagId>,
}

impl TaggingEngine {
    /// Suggest tag values matching a case-insensitive substring.
    ///
    /// With `object_id`, values already bound to that object under this
    /// taxonomy are excluded, supporting "suggest tags not already
    /// applied". `object_tags_only` is reserved for a mode completing only
    /// already-applied tags and is not implemented; variants without
    /// autocomplete support fail the same way rather than returning
    /// partial data.
    pub fn autocomplete_tags(
        &self,
        taxonomy: &Taxonomy,
        search_term: &str,
        object_id: Option<&str>,
        object_tags_only: bool,
    ) -> Result<Vec<AutocompleteEntry>, TaggingError> {
        let variant = self.registry().cast(taxonomy)?;
        if object_tags_only || !variant.supports_autocomplete() {
            return Err(TaggingError::AutocompleteUnsupported {
                taxonomy: taxonomy.name.clone(),
            });
        }

        self.db().with_reader(|conn| {
            let excluded: FxHashSet<String> = match object_id {
                Some(object_id) => {
                    object_tags::values_bound_to_object(conn, taxonomy.id, object_id)?
                        .into_iter()
                        .collect()
                }
                None => FxHashSet::default(),
            };

            let entries: Vec<AutocompleteEntry> = if taxonomy.allow_free_text {
                object_tags::distinct_values(conn, taxonomy.id, search_term)?
                    .into_iter()
                    .map(|value| AutocompleteEntry {
                        value,
                        tag_id: None,
                    })
                    .collect()
            } else if taxonomy.variant_key() == taxa_core::constants::VARIANT_CLOSED {
                tags::search_values(conn, taxonomy.id, search_term)?
                    .into_iter()
                    .map(|(value, tag_id)| AutocompleteEntry {
                        value,
                        tag_id: Some(tag_id),
                    })
                    .collect()
            } else {
                // Opted-in model-backed variants complete against their
                // enumeration; materialized rows contribute their identity.
                let lowered = search_term.to_lowercase();
                let mut entries = Vec::new();
                for tag in variant.root_tags(conn, taxonomy, Some(search_term))? {
                    if !tag.value.to_lowercase().contains(&lowered) {
                        continue;
                    }
                    let tag_id = match (&tag.id, &tag.external_id) {
                        (Some(id), _) => Some(*id),
                        (None, Some(external_id)) => {
                            tags::find_tag_by_external_id(conn, taxonomy.id, external_id)?
                                .and_then(|stored| stored.id)
                        }
                        (None, None) => None,
                    };
                    entries.push(AutocompleteEntry {
                        value: tag.value,
                        tag_id,
                    });
                }
                entries
            };

            // Dedup by value, first occurrence wins; inputs are already
            // value-sorted.
            let mut seen = FxHashSet::default();
            Ok(entries
                .into_iter()
                .filter(|entry| !excluded.contains(&entry.value))
                .filter(|entry| seen.insert(entry.value.clone()))
                .collect())
        })
    }
}
