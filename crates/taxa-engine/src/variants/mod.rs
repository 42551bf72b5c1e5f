//! Taxonomy variant capability interface and its implementations.
//!
//! The engine never branches on taxonomy kind directly; it dispatches
//! through this trait. Closed taxonomies read the stored tag tree,
//! free-text taxonomies accept anything, and model-backed taxonomies
//! synthesize tags from an external enumeration keyed by a stable
//! external id.

pub mod closed;
pub mod free_text;
pub mod model_backed;

use rusqlite::Connection;
use taxa_core::errors::TaggingError;
use taxa_core::types::{Tag, TagId, Taxonomy};

pub use closed::ClosedVariant;
pub use free_text::FreeTextVariant;
pub use model_backed::{Enumeration, LanguageEnumeration, ModelBackedVariant};

/// Capability interface every taxonomy variant implements.
pub trait TaxonomyVariant: Send + Sync {
    /// The variant key this implementation dispatches for.
    fn key(&self) -> &str;

    /// Whether the vocabulary accepts this value.
    fn contains(
        &self,
        conn: &Connection,
        taxonomy: &Taxonomy,
        value: &str,
    ) -> Result<bool, TaggingError>;

    /// Resolve a value to its canonical tag. Model-backed variants return
    /// an ephemeral tag here; use `materialize` when a stored row is
    /// needed.
    fn resolve(
        &self,
        conn: &Connection,
        taxonomy: &Taxonomy,
        value: &str,
    ) -> Result<Tag, TaggingError>;

    /// Root-level tags, siblings ordered by value, optionally filtered by
    /// a case-insensitive substring.
    fn root_tags(
        &self,
        conn: &Connection,
        taxonomy: &Taxonomy,
        search_term: Option<&str>,
    ) -> Result<Vec<Tag>, TaggingError>;

    /// Direct children of one tag, same ordering and filtering contract.
    fn children_of(
        &self,
        conn: &Connection,
        taxonomy: &Taxonomy,
        parent_id: TagId,
        search_term: Option<&str>,
    ) -> Result<Vec<Tag>, TaggingError>;

    /// Whether autocomplete may be served for this variant.
    fn supports_autocomplete(&self) -> bool {
        false
    }

    /// Resolve a value to a stored tag row, creating one when the variant
    /// synthesizes its vocabulary. The binding engine calls this at write
    /// time so bindings always reference stable rows.
    fn materialize(
        &self,
        conn: &Connection,
        taxonomy: &Taxonomy,
        value: &str,
    ) -> Result<Tag, TaggingError> {
        self.resolve(conn, taxonomy, value)
    }
}
