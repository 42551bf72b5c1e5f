//! Hierarchy listing, traversal, and search.
//!
//! The full-taxonomy listing walks the tree level by level: all depth-0
//! tags ordered by value, then all depth-1 tags ordered by value, and so
//! on up to the depth ceiling. Search applies the substring filter to each
//! level's output while still walking the unfiltered tree, so a deep match
//! is never lost behind a non-matching parent.

use rusqlite::Connection;
use smallvec::SmallVec;
use taxa_core::errors::TaggingError;
use taxa_core::types::{Lineage, ObjectTag, Tag, TagId, Taxonomy};
use taxa_storage::queries::tags;

use crate::variants::TaxonomyVariant;
use crate::TaggingEngine;

/// Bound on ancestor walks. Tree depth is unbounded in storage, so lineage
/// lookup needs its own ceiling to stay cycle-proof.
const MAX_LINEAGE_DEPTH: usize = 32;

impl TaggingEngine {
    /// All tags of a taxonomy in level order, up to the configured depth
    /// ceiling.
    pub fn get_tags(&self, taxonomy: &Taxonomy) -> Result<Vec<Tag>, TaggingError> {
        self.get_tags_with_depth(taxonomy, self.config().effective_tree_depth_limit())
    }

    /// All tags of a taxonomy in level order, with an explicit ceiling.
    pub fn get_tags_with_depth(
        &self,
        taxonomy: &Taxonomy,
        depth_limit: usize,
    ) -> Result<Vec<Tag>, TaggingError> {
        let variant = self.registry().cast(taxonomy)?;
        self.db()
            .with_reader(|conn| level_walk(conn, taxonomy, variant.as_ref(), depth_limit, None))
    }

    /// Root-level tags, ordered by value.
    pub fn get_root_tags(&self, taxonomy: &Taxonomy) -> Result<Vec<Tag>, TaggingError> {
        let variant = self.registry().cast(taxonomy)?;
        self.db()
            .with_reader(|conn| variant.root_tags(conn, taxonomy, None))
    }

    /// Direct children of a tag, ordered by value, optionally filtered by
    /// a case-insensitive substring.
    pub fn get_children_tags(
        &self,
        taxonomy: &Taxonomy,
        parent_id: TagId,
        search_term: Option<&str>,
    ) -> Result<Vec<Tag>, TaggingError> {
        let variant = self.registry().cast(taxonomy)?;
        self.db()
            .with_reader(|conn| variant.children_of(conn, taxonomy, parent_id, search_term))
    }

    /// Tags matching a case-insensitive substring, in hierarchy order.
    pub fn search_tags(
        &self,
        taxonomy: &Taxonomy,
        search_term: &str,
    ) -> Result<Vec<Tag>, TaggingError> {
        let variant = self.registry().cast(taxonomy)?;
        let depth_limit = self.config().effective_tree_depth_limit();
        self.db().with_reader(|conn| {
            level_walk(conn, taxonomy, variant.as_ref(), depth_limit, Some(search_term))
        })
    }

    /// Ordered ancestors-to-self value path for a binding. Falls back to
    /// the denormalized value as a single-element lineage when no live tag
    /// backs the binding.
    pub fn get_lineage(&self, object_tag: &ObjectTag) -> Result<Lineage, TaggingError> {
        let Some(tag_id) = object_tag.tag_id else {
            return Ok(object_tag.value_lineage());
        };

        self.db().with_reader(|conn| {
            let Some(tag) = tags::get_tag(conn, tag_id)? else {
                return Ok(object_tag.value_lineage());
            };

            let ancestors = tags::ancestors_of(conn, &tag, MAX_LINEAGE_DEPTH)?;
            let mut lineage: Lineage = ancestors.into_iter().map(|t| t.value).collect();
            lineage.push(tag.value);
            Ok(lineage)
        })
    }
}

/// Level-by-level walk shared by the full listing and search.
fn level_walk(
    conn: &Connection,
    taxonomy: &Taxonomy,
    variant: &dyn TaxonomyVariant,
    depth_limit: usize,
    search_term: Option<&str>,
) -> Result<Vec<Tag>, TaggingError> {
    let mut result = variant.root_tags(conn, taxonomy, search_term)?;
    if depth_limit <= 1 {
        return Ok(result);
    }

    // Parents for the next level come from the unfiltered tree.
    let mut parents: SmallVec<[TagId; 16]> = match search_term {
        None => result.iter().filter_map(|t| t.id).collect(),
        Some(_) => variant
            .root_tags(conn, taxonomy, None)?
            .iter()
            .filter_map(|t| t.id)
            .collect(),
    };

    for _ in 1..depth_limit {
        if parents.is_empty() {
            break;
        }
        let level = tags::children_of_many(conn, taxonomy.id, &parents, search_term)?;
        let next_parents: SmallVec<[TagId; 16]> = match search_term {
            None => level.iter().filter_map(|t| t.id).collect(),
            Some(_) => tags::children_of_many(conn, taxonomy.id, &parents, None)?
                .iter()
                .filter_map(|t| t.id)
                .collect(),
        };
        result.extend(level);
        parents = next_parents;
    }

    Ok(result)
}
