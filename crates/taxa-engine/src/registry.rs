//! Variant dispatch for taxonomies.
//!
//! The registry resolves a taxonomy's variant key to its capability
//! implementation exactly once per taxonomy instance and memoizes the
//! result, so repeated dispatch costs a map lookup rather than another
//! resolution.

use std::sync::{Arc, RwLock};

use rustc_hash::FxHashMap;
use taxa_core::errors::ConfigError;
use taxa_core::types::{Taxonomy, TaxonomyId};

use crate::variants::{model_backed, ClosedVariant, FreeTextVariant, TaxonomyVariant};

/// Registry of taxonomy variants, keyed by variant key string.
pub struct TaxonomyRegistry {
    variants: FxHashMap<String, Arc<dyn TaxonomyVariant>>,
    cast_cache: RwLock<FxHashMap<TaxonomyId, Arc<dyn TaxonomyVariant>>>,
}

impl TaxonomyRegistry {
    /// An empty registry. Most callers want `with_builtin_variants`.
    pub fn new() -> Self {
        Self {
            variants: FxHashMap::default(),
            cast_cache: RwLock::new(FxHashMap::default()),
        }
    }

    /// The stock registry: closed, free-text, and the language
    /// model-backed variant.
    pub fn with_builtin_variants() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ClosedVariant));
        registry.register(Arc::new(FreeTextVariant));
        registry.register(Arc::new(model_backed::language_variant()));
        registry
    }

    /// Register a variant under its key. Re-registering a key replaces the
    /// previous implementation and drops stale memoized casts.
    pub fn register(&mut self, variant: Arc<dyn TaxonomyVariant>) {
        self.variants.insert(variant.key().to_string(), variant);
        if let Ok(mut cache) = self.cast_cache.write() {
            cache.clear();
        }
    }

    /// Whether a variant key is known.
    pub fn is_registered(&self, key: &str) -> bool {
        self.variants.contains_key(key)
    }

    /// Resolve the variant for a taxonomy, memoized per taxonomy id.
    pub fn cast(&self, taxonomy: &Taxonomy) -> Result<Arc<dyn TaxonomyVariant>, ConfigError> {
        if let Ok(cache) = self.cast_cache.read() {
            if let Some(variant) = cache.get(&taxonomy.id) {
                return Ok(Arc::clone(variant));
            }
        }

        let key = taxonomy.variant_key();
        let variant = self
            .variants
            .get(key)
            .ok_or_else(|| ConfigError::UnknownVariant {
                variant: key.to_string(),
            })?;

        if let Ok(mut cache) = self.cast_cache.write() {
            cache.insert(taxonomy.id, Arc::clone(variant));
        }
        Ok(Arc::clone(variant))
    }

    /// Drop the memoized cast for one taxonomy. Called after taxonomy
    /// updates or deletion so the next cast re-resolves.
    pub fn invalidate(&self, taxonomy_id: TaxonomyId) {
        if let Ok(mut cache) = self.cast_cache.write() {
            cache.remove(&taxonomy_id);
        }
    }
}

impl Default for TaxonomyRegistry {
    fn default() -> Self {
        Self::with_builtin_variants()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxa_core::types::TaxonomyParams;

    fn taxonomy(variant: &str, allow_free_text: bool) -> Taxonomy {
        let params = TaxonomyParams::new("Test");
        Taxonomy {
            id: TaxonomyId::new(1),
            name: params.name,
            description: String::new(),
            enabled: true,
            required: false,
            allow_multiple: false,
            allow_free_text,
            system_defined: false,
            visible_to_authors: true,
            variant: variant.to_string(),
        }
    }

    #[test]
    fn test_cast_dispatches_on_variant_key() {
        let registry = TaxonomyRegistry::with_builtin_variants();
        assert_eq!(registry.cast(&taxonomy("closed", false)).unwrap().key(), "closed");
        assert_eq!(
            registry.cast(&taxonomy("language", false)).unwrap().key(),
            "language"
        );
    }

    #[test]
    fn test_free_text_flag_overrides_stored_key() {
        let registry = TaxonomyRegistry::with_builtin_variants();
        let variant = registry.cast(&taxonomy("closed", true)).unwrap();
        assert_eq!(variant.key(), "free_text");
    }

    #[test]
    fn test_unknown_variant_is_a_config_error() {
        let registry = TaxonomyRegistry::with_builtin_variants();
        let err = match registry.cast(&taxonomy("martian", false)) {
            Ok(_) => panic!("expected cast to fail for unknown variant"),
            Err(e) => e,
        };
        assert!(matches!(err, ConfigError::UnknownVariant { .. }));
    }
}
