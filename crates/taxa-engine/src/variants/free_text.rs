//! Free-text taxonomy: any string is a valid value, no tag tree.

use rusqlite::Connection;
use taxa_core::constants::VARIANT_FREE_TEXT;
use taxa_core::errors::TaggingError;
use taxa_core::types::{Tag, TagId, Taxonomy};

use super::TaxonomyVariant;

pub struct FreeTextVariant;

impl TaxonomyVariant for FreeTextVariant {
    fn key(&self) -> &str {
        VARIANT_FREE_TEXT
    }

    fn contains(
        &self,
        _conn: &Connection,
        _taxonomy: &Taxonomy,
        value: &str,
    ) -> Result<bool, TaggingError> {
        Ok(!value.is_empty())
    }

    /// Free-text values have no canonical tag to resolve to.
    fn resolve(
        &self,
        _conn: &Connection,
        _taxonomy: &Taxonomy,
        value: &str,
    ) -> Result<Tag, TaggingError> {
        Err(TaggingError::TagDoesNotExist {
            value: value.to_string(),
        })
    }

    fn root_tags(
        &self,
        _conn: &Connection,
        _taxonomy: &Taxonomy,
        _search_term: Option<&str>,
    ) -> Result<Vec<Tag>, TaggingError> {
        Ok(Vec::new())
    }

    fn children_of(
        &self,
        _conn: &Connection,
        _taxonomy: &Taxonomy,
        _parent_id: TagId,
        _search_term: Option<&str>,
    ) -> Result<Vec<Tag>, TaggingError> {
        Ok(Vec::new())
    }

    /// Autocomplete over free-text taxonomies searches historical binding
    /// values, handled by the autocomplete engine.
    fn supports_autocomplete(&self) -> bool {
        true
    }
}
