//! The object-tag binding engine.
//!
//! `tag_object` is a full replace for `(object_id, taxonomy)`: the new
//! resolved set becomes the binding set, existing bindings not present are
//! deleted, and the whole thing commits as one IMMEDIATE transaction so
//! concurrent calls for the same pair serialize last-committed-wins.

use rusqlite::{Connection, TransactionBehavior};
use rustc_hash::FxHashSet;
use taxa_core::errors::{StorageError, TaggingError};
use taxa_core::types::{ObjectTag, Tag, Taxonomy, TaxonomyId};
use taxa_storage::queries::object_tags;

use crate::TaggingEngine;

/// One resolved input value: a stored tag for closed/model-backed
/// vocabularies, or the verbatim string for free text.
enum ResolvedValue {
    Stored(Tag),
    FreeText(String),
}

impl TaggingEngine {
    /// Replace the tags applied to an object under one taxonomy.
    ///
    /// Values are deduplicated preserving first occurrence, validated
    /// against the taxonomy's policy flags and the per-object cap, resolved
    /// through the taxonomy's variant, and written atomically. Any failure
    /// leaves prior bindings unchanged.
    pub fn tag_object(
        &self,
        taxonomy: &Taxonomy,
        values: &[String],
        object_id: &str,
    ) -> Result<Vec<ObjectTag>, TaggingError> {
        let variant = self.registry().cast(taxonomy)?;

        // Dedup before any policy check: repeating one value is not a
        // cardinality violation.
        let mut seen = FxHashSet::default();
        let deduped: Vec<&str> = values
            .iter()
            .map(String::as_str)
            .filter(|v| seen.insert(*v))
            .collect();

        let cap = self.config().effective_max_object_tags();

        self.db().with_writer(|conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(|e| StorageError::SqliteError {
                    message: e.to_string(),
                })?;

            // The cap counts bindings on other taxonomies plus the new
            // set, so replacing within one taxonomy never trips it unless
            // the object's total grows.
            let other_count = object_tags::count_other_taxonomy_tags(&tx, object_id, taxonomy.id)?;
            if other_count + deduped.len() > cap {
                return Err(TaggingError::TagLimitExceeded {
                    cap,
                    object_id: object_id.to_string(),
                });
            }

            if !taxonomy.allow_multiple && deduped.len() > 1 {
                return Err(TaggingError::only_one_tag(&taxonomy.name));
            }
            if taxonomy.required && deduped.is_empty() {
                return Err(TaggingError::at_least_one_tag(&taxonomy.name));
            }

            // Resolve everything before writing anything: an unresolvable
            // value aborts the whole call.
            let mut resolved = Vec::with_capacity(deduped.len());
            for value in &deduped {
                if taxonomy.allow_free_text {
                    resolved.push(ResolvedValue::FreeText((*value).to_string()));
                } else {
                    resolved.push(ResolvedValue::Stored(
                        variant.materialize(&tx, taxonomy, value)?,
                    ));
                }
            }

            let result = replace_bindings(&tx, taxonomy, object_id, &resolved)?;

            tx.commit().map_err(|e| StorageError::SqliteError {
                message: e.to_string(),
            })?;

            tracing::debug!(
                taxonomy = %taxonomy.id,
                object = object_id,
                count = result.len(),
                "replaced object tags"
            );
            Ok(result)
        })
    }

    /// Boundary-layer entry point taking untyped JSON input. Anything but
    /// an array of strings is a type mismatch naming the offending type.
    pub fn tag_object_json(
        &self,
        taxonomy: &Taxonomy,
        values: &serde_json::Value,
        object_id: &str,
    ) -> Result<Vec<ObjectTag>, TaggingError> {
        let array = values
            .as_array()
            .ok_or(TaggingError::TagsNotAList {
                type_name: json_type_name(values),
            })?;

        let mut strings = Vec::with_capacity(array.len());
        for item in array {
            let s = item.as_str().ok_or(TaggingError::TagsNotAList {
                type_name: json_type_name(item),
            })?;
            strings.push(s.to_string());
        }
        self.tag_object(taxonomy, &strings, object_id)
    }

    /// All bindings for an object, optionally narrowed to one taxonomy,
    /// ordered by taxonomy identity then stored order.
    pub fn get_object_tags(
        &self,
        object_id: &str,
        taxonomy_id: Option<TaxonomyId>,
    ) -> Result<Vec<ObjectTag>, TaggingError> {
        Ok(self
            .db()
            .with_reader(|conn| object_tags::get_object_tags(conn, object_id, taxonomy_id))?)
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Diff the resolved set against the current bindings: keep and refresh
/// matches, insert the rest, delete what is no longer present. Runs inside
/// the caller's transaction.
fn replace_bindings(
    conn: &Connection,
    taxonomy: &Taxonomy,
    object_id: &str,
    resolved: &[ResolvedValue],
) -> Result<Vec<ObjectTag>, StorageError> {
    let mut remaining = object_tags::get_object_tags(conn, object_id, Some(taxonomy.id))?;

    for (position, entry) in resolved.iter().enumerate() {
        let matched = match entry {
            // Closed vocabularies match existing bindings by tag link, so
            // a renamed tag refreshes the stored display text on re-tag.
            ResolvedValue::Stored(tag) => remaining
                .iter()
                .position(|binding| binding.tag_id == tag.id),
            // Free text matches by the stored string itself.
            ResolvedValue::FreeText(value) => remaining
                .iter()
                .position(|binding| binding.tag_id.is_none() && binding.value == *value),
        };

        let (tag_id, value) = match entry {
            ResolvedValue::Stored(tag) => (tag.id, tag.value.as_str()),
            ResolvedValue::FreeText(value) => (None, value.as_str()),
        };

        match matched {
            Some(index) => {
                let binding = remaining.remove(index);
                object_tags::update_object_tag(
                    conn,
                    binding.id,
                    tag_id,
                    value,
                    &taxonomy.name,
                    position,
                )?;
            }
            None => {
                object_tags::insert_object_tag(
                    conn,
                    object_id,
                    taxonomy.id,
                    tag_id,
                    value,
                    &taxonomy.name,
                    position,
                )?;
            }
        }
    }

    // Whatever was not re-matched is no longer part of the set.
    let stale: Vec<_> = remaining.iter().map(|binding| binding.id).collect();
    object_tags::delete_object_tags(conn, &stale)?;

    object_tags::get_object_tags(conn, object_id, Some(taxonomy.id))
}
