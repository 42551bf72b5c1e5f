//! Closed-vocabulary taxonomy: an explicit stored tag tree.

use rusqlite::Connection;
use taxa_core::constants::VARIANT_CLOSED;
use taxa_core::errors::TaggingError;
use taxa_core::types::{Tag, TagId, Taxonomy};
use taxa_storage::queries::tags;

use super::TaxonomyVariant;

pub struct ClosedVariant;

impl TaxonomyVariant for ClosedVariant {
    fn key(&self) -> &str {
        VARIANT_CLOSED
    }

    fn contains(
        &self,
        conn: &Connection,
        taxonomy: &Taxonomy,
        value: &str,
    ) -> Result<bool, TaggingError> {
        Ok(tags::find_tag_by_value(conn, taxonomy.id, value)?.is_some())
    }

    fn resolve(
        &self,
        conn: &Connection,
        taxonomy: &Taxonomy,
        value: &str,
    ) -> Result<Tag, TaggingError> {
        tags::find_tag_by_value(conn, taxonomy.id, value)?.ok_or_else(|| {
            TaggingError::TagDoesNotExist {
                value: value.to_string(),
            }
        })
    }

    fn root_tags(
        &self,
        conn: &Connection,
        taxonomy: &Taxonomy,
        search_term: Option<&str>,
    ) -> Result<Vec<Tag>, TaggingError> {
        Ok(tags::children_of(conn, taxonomy.id, None, search_term)?)
    }

    fn children_of(
        &self,
        conn: &Connection,
        taxonomy: &Taxonomy,
        parent_id: TagId,
        search_term: Option<&str>,
    ) -> Result<Vec<Tag>, TaggingError> {
        Ok(tags::children_of(
            conn,
            taxonomy.id,
            Some(parent_id),
            search_term,
        )?)
    }

    fn supports_autocomplete(&self) -> bool {
        true
    }
}
