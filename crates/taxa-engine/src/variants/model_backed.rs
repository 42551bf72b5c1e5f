//! Model-backed taxonomies: vocabularies synthesized from an external
//! enumeration (language codes, user directories, …) keyed by a stable
//! external id rather than a row identity.

use std::sync::Arc;

use rusqlite::Connection;
use taxa_core::constants::VARIANT_LANGUAGE;
use taxa_core::errors::TaggingError;
use taxa_core::types::{Tag, TagId, Taxonomy};
use taxa_storage::queries::tags;

use super::TaxonomyVariant;

/// An external enumeration backing a model-backed taxonomy.
///
/// Entries are `(external_id, value)` pairs. The external id must be
/// stable across calls; the display value may drift (tagging refreshes the
/// materialized row's spelling).
pub trait Enumeration: Send + Sync {
    fn entries(&self) -> Vec<(String, String)>;
}

/// A taxonomy variant whose vocabulary is an external enumeration.
///
/// Listing synthesizes ephemeral tags (no row identity); tagging
/// materializes a stored row keyed by external id. Autocomplete is off
/// unless the host opts in.
pub struct ModelBackedVariant {
    key: String,
    enumeration: Arc<dyn Enumeration>,
    autocomplete: bool,
}

impl ModelBackedVariant {
    pub fn new(key: impl Into<String>, enumeration: Arc<dyn Enumeration>) -> Self {
        Self {
            key: key.into(),
            enumeration,
            autocomplete: false,
        }
    }

    /// Opt this variant into autocomplete support.
    pub fn with_autocomplete(mut self) -> Self {
        self.autocomplete = true;
        self
    }

    /// Entries sorted by display value, the same ordering as stored tags.
    fn sorted_entries(&self) -> Vec<(String, String)> {
        let mut entries = self.enumeration.entries();
        entries.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        entries
    }

    fn find_by_value(&self, value: &str) -> Option<(String, String)> {
        self.sorted_entries()
            .into_iter()
            .find(|(_, v)| v == value)
    }
}

impl TaxonomyVariant for ModelBackedVariant {
    fn key(&self) -> &str {
        &self.key
    }

    fn contains(
        &self,
        _conn: &Connection,
        _taxonomy: &Taxonomy,
        value: &str,
    ) -> Result<bool, TaggingError> {
        Ok(self.find_by_value(value).is_some())
    }

    fn resolve(
        &self,
        _conn: &Connection,
        taxonomy: &Taxonomy,
        value: &str,
    ) -> Result<Tag, TaggingError> {
        let (external_id, value) =
            self.find_by_value(value)
                .ok_or_else(|| TaggingError::TagDoesNotExist {
                    value: value.to_string(),
                })?;
        Ok(Tag::ephemeral(taxonomy.id, value, external_id))
    }

    fn root_tags(
        &self,
        _conn: &Connection,
        taxonomy: &Taxonomy,
        search_term: Option<&str>,
    ) -> Result<Vec<Tag>, TaggingError> {
        let term = search_term.map(str::to_lowercase);
        Ok(self
            .sorted_entries()
            .into_iter()
            .filter(|(_, value)| {
                term.as_deref()
                    .map_or(true, |t| value.to_lowercase().contains(t))
            })
            .map(|(external_id, value)| Tag::ephemeral(taxonomy.id, value, external_id))
            .collect())
    }

    /// Enumerations are flat: no entry has children.
    fn children_of(
        &self,
        _conn: &Connection,
        _taxonomy: &Taxonomy,
        _parent_id: TagId,
        _search_term: Option<&str>,
    ) -> Result<Vec<Tag>, TaggingError> {
        Ok(Vec::new())
    }

    fn supports_autocomplete(&self) -> bool {
        self.autocomplete
    }

    fn materialize(
        &self,
        conn: &Connection,
        taxonomy: &Taxonomy,
        value: &str,
    ) -> Result<Tag, TaggingError> {
        let (external_id, value) =
            self.find_by_value(value)
                .ok_or_else(|| TaggingError::TagDoesNotExist {
                    value: value.to_string(),
                })?;
        Ok(tags::materialize_external_tag(
            conn,
            taxonomy.id,
            &external_id,
            &value,
        )?)
    }
}

/// The stock language enumeration: ISO 639-1 codes and English names.
/// Hosts serving a different language set register their own enumeration
/// under the same variant key.
pub struct LanguageEnumeration {
    languages: Vec<(String, String)>,
}

impl LanguageEnumeration {
    pub fn new(languages: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            languages: languages
                .into_iter()
                .map(|(code, name)| (code.into(), name.into()))
                .collect(),
        }
    }
}

impl Default for LanguageEnumeration {
    fn default() -> Self {
        Self::new([
            ("ar", "Arabic"),
            ("de", "German"),
            ("en", "English"),
            ("es", "Spanish"),
            ("fr", "French"),
            ("hi", "Hindi"),
            ("ja", "Japanese"),
            ("pt", "Portuguese"),
            ("ru", "Russian"),
            ("zh", "Chinese"),
        ])
    }
}

impl Enumeration for LanguageEnumeration {
    fn entries(&self) -> Vec<(String, String)> {
        self.languages.clone()
    }
}

/// The stock language variant under the `language` key.
pub fn language_variant() -> ModelBackedVariant {
    ModelBackedVariant::new(VARIANT_LANGUAGE, Arc::new(LanguageEnumeration::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_sorted_by_value() {
        let variant = language_variant();
        let entries = variant.sorted_entries();
        let values: Vec<_> = entries.iter().map(|(_, v)| v.as_str()).collect();
        let mut sorted = values.clone();
        sorted.sort_unstable();
        assert_eq!(values, sorted);
    }

    #[test]
    fn test_find_by_value() {
        let variant = language_variant();
        let (code, name) = variant.find_by_value("English").unwrap();
        assert_eq!(code, "en");
        assert_eq!(name, "English");
        assert!(variant.find_by_value("Klingon").is_none());
    }
}
