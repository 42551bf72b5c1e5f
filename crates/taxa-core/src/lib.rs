//! taxa-core: shared foundation for the taxa tagging engine.
//!
//! This crate carries everything the storage and engine layers have in
//! common: typed identifiers, the domain records (Taxonomy, Tag,
//! ObjectTag), error enums, runtime configuration, tracing setup, and the
//! permission predicate table consulted by every mutating entry point.

pub mod config;
pub mod constants;
pub mod errors;
pub mod permissions;
pub mod tracing;
pub mod types;

// Re-exports for convenience
pub use config::TaggingConfig;
pub use errors::{ConfigError, ErrorCode, StorageError, TaggingError};
pub use permissions::{
    ObjectPermissionCheck, PermissionError, PermissionResource, PermissionTable, UserContext,
};
pub use types::{
    Lineage, ObjectTag, ObjectTagId, Tag, TagId, Taxonomy, TaxonomyId, TaxonomyParams,
    VARIANT_CLOSED, VARIANT_FREE_TEXT, VARIANT_LANGUAGE,
};
