//! Shared constants for the taxa tagging engine.

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default cap on bindings per object, counted across all taxonomies.
pub const DEFAULT_MAX_OBJECT_TAGS: usize = 100;

/// Default depth ceiling for full-taxonomy hierarchy listings.
pub const DEFAULT_TREE_DEPTH_LIMIT: usize = 3;

/// Variant key for plain closed-vocabulary taxonomies.
pub const VARIANT_CLOSED: &str = "closed";

/// Variant key for free-text taxonomies.
pub const VARIANT_FREE_TEXT: &str = "free_text";

/// Variant key for the stock language model-backed taxonomy.
pub const VARIANT_LANGUAGE: &str = "language";
