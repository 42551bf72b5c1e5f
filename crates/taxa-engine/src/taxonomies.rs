//! Taxonomy and tag administration.

use taxa_core::errors::{ConfigError, TaggingError};
use taxa_core::types::{Tag, TagId, Taxonomy, TaxonomyId, TaxonomyParams};
use taxa_storage::queries::{tags, taxonomies};

use crate::TaggingEngine;

impl TaggingEngine {
    /// Create a taxonomy. The variant key must be registered; an unknown
    /// key is a configuration error naming the offender.
    pub fn create_taxonomy(&self, params: &TaxonomyParams) -> Result<Taxonomy, TaggingError> {
        if !params.allow_free_text && !self.registry().is_registered(&params.variant) {
            return Err(ConfigError::UnknownVariant {
                variant: params.variant.clone(),
            }
            .into());
        }

        let taxonomy = self
            .db()
            .with_writer(|conn| taxonomies::insert_taxonomy(conn, params))?;
        tracing::info!(taxonomy = %taxonomy.id, name = %taxonomy.name, "created taxonomy");
        Ok(taxonomy)
    }

    /// Get a taxonomy by id, or None when it does not exist.
    pub fn get_taxonomy(&self, id: TaxonomyId) -> Result<Option<Taxonomy>, TaggingError> {
        Ok(self.db().with_reader(|conn| taxonomies::get_taxonomy(conn, id))?)
    }

    /// List taxonomies ordered by name. `Some(true)`/`Some(false)` filter
    /// by the enabled flag; `None` returns both.
    pub fn get_taxonomies(&self, enabled: Option<bool>) -> Result<Vec<Taxonomy>, TaggingError> {
        Ok(self
            .db()
            .with_reader(|conn| taxonomies::list_taxonomies(conn, enabled))?)
    }

    /// The default listing: enabled taxonomies only.
    pub fn get_enabled_taxonomies(&self) -> Result<Vec<Taxonomy>, TaggingError> {
        self.get_taxonomies(Some(true))
    }

    /// Persist updated taxonomy fields and drop its memoized cast.
    pub fn update_taxonomy(&self, taxonomy: &Taxonomy) -> Result<(), TaggingError> {
        self.db()
            .with_writer(|conn| taxonomies::update_taxonomy(conn, taxonomy))?;
        self.registry().invalidate(taxonomy.id);
        Ok(())
    }

    /// Delete a taxonomy. Its tags cascade away; bindings keep their
    /// denormalized value and lose the taxonomy link.
    pub fn delete_taxonomy(&self, id: TaxonomyId) -> Result<bool, TaggingError> {
        let deleted = self
            .db()
            .with_writer(|conn| taxonomies::delete_taxonomy(conn, id))?;
        self.registry().invalidate(id);
        if deleted {
            tracing::info!(taxonomy = %id, "deleted taxonomy");
        }
        Ok(deleted)
    }

    /// Add a tag to a closed taxonomy's tree.
    ///
    /// Free-text taxonomies have no editable tag tree and system-defined
    /// vocabularies are platform-owned, so both are rejected here
    /// regardless of what the permission layer allowed through.
    pub fn add_tag(
        &self,
        taxonomy: &Taxonomy,
        value: &str,
        parent_id: Option<TagId>,
        external_id: Option<&str>,
    ) -> Result<Tag, TaggingError> {
        reject_tree_edit(taxonomy)?;

        self.db().with_writer(|conn| {
            if tags::find_sibling_by_value(conn, taxonomy.id, parent_id, value)?.is_some() {
                return Err(TaggingError::TagAlreadyExists {
                    value: value.to_string(),
                });
            }
            let tag = tags::insert_tag(conn, taxonomy.id, value, parent_id, external_id)?;
            tracing::debug!(taxonomy = %taxonomy.id, value = %value, "added tag");
            Ok(tag)
        })
    }

    /// Rename a tag. Existing bindings keep the display text they were
    /// written with; only re-tagging refreshes it.
    pub fn update_tag(
        &self,
        taxonomy: &Taxonomy,
        tag_id: TagId,
        value: &str,
    ) -> Result<Tag, TaggingError> {
        reject_tree_edit(taxonomy)?;

        self.db().with_writer(|conn| {
            let current = tags::get_tag(conn, tag_id)?.ok_or(
                taxa_core::errors::StorageError::NotFound {
                    entity: "tag",
                    id: tag_id.inner(),
                },
            )?;
            if tags::find_sibling_by_value(conn, taxonomy.id, current.parent_id, value)?
                .is_some_and(|t| t.id != Some(tag_id))
            {
                return Err(TaggingError::TagAlreadyExists {
                    value: value.to_string(),
                });
            }
            tags::update_tag_value(conn, tag_id, value)?;
            Ok(Tag {
                value: value.to_string(),
                ..current
            })
        })
    }

    /// Delete a tag and its subtree. Bindings that reference it are left
    /// dangling, observable as `is_deleted`.
    pub fn delete_tag(&self, tag_id: TagId) -> Result<bool, TaggingError> {
        let deleted = self.db().with_writer(|conn| tags::delete_tag(conn, tag_id))?;
        if deleted {
            tracing::debug!(tag = %tag_id, "deleted tag");
        }
        Ok(deleted)
    }
}

fn reject_tree_edit(taxonomy: &Taxonomy) -> Result<(), TaggingError> {
    if taxonomy.allow_free_text {
        return Err(TaggingError::PolicyViolation {
            taxonomy: taxonomy.name.clone(),
            message: "is free-text and has no editable tag tree".to_string(),
        });
    }
    if taxonomy.system_defined {
        return Err(TaggingError::PolicyViolation {
            taxonomy: taxonomy.name.clone(),
            message: "is system-defined and cannot be edited".to_string(),
        });
    }
    Ok(())
}
