//! taxa-engine: the tagging engine proper.
//!
//! Builds on taxa-storage to provide taxonomy administration, the
//! object-tag binding engine, the resync reconciler, hierarchy search and
//! autocomplete, and tag import/export. Every mutating entry point is
//! expected to be gated by the permission table in taxa-core before it is
//! reached; the engine itself performs policy validation, not
//! authorization.

pub mod autocomplete;
pub mod bindings;
pub mod hierarchy;
pub mod import_export;
pub mod registry;
pub mod resync;
pub mod taxonomies;
pub mod variants;

use std::sync::Arc;

use taxa_core::config::TaggingConfig;
use taxa_storage::DatabaseManager;

use registry::TaxonomyRegistry;

pub use autocomplete::AutocompleteEntry;
pub use import_export::{ImportAction, ParserFormat, TagImportPlan, TagItem};
pub use variants::{Enumeration, TaxonomyVariant};

/// The tagging engine. One instance per process; all cross-request state
/// lives in the database.
pub struct TaggingEngine {
    db: Arc<DatabaseManager>,
    registry: TaxonomyRegistry,
    config: TaggingConfig,
}

impl TaggingEngine {
    /// Build an engine with the default configuration and the stock
    /// variant registry (closed, free-text, language).
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self::with_config(db, TaggingConfig::default())
    }

    pub fn with_config(db: Arc<DatabaseManager>, config: TaggingConfig) -> Self {
        Self {
            db,
            registry: TaxonomyRegistry::with_builtin_variants(),
            config,
        }
    }

    pub fn db(&self) -> &Arc<DatabaseManager> {
        &self.db
    }

    pub fn config(&self) -> &TaggingConfig {
        &self.config
    }

    pub fn registry(&self) -> &TaxonomyRegistry {
        &self.registry
    }

    /// Mutable registry access, for hosts registering model-backed
    /// variants at startup.
    pub fn registry_mut(&mut self) -> &mut TaxonomyRegistry {
        &mut self.registry
    }
}
