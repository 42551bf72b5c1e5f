//! Taxonomy record and creation parameters.

use serde::{Deserialize, Serialize};

use super::identifiers::TaxonomyId;
use crate::constants::{VARIANT_CLOSED, VARIANT_FREE_TEXT};

/// A named, policy-governed vocabulary of tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub id: TaxonomyId,
    pub name: String,
    pub description: String,
    /// Visibility gate: disabled taxonomies are invisible to non-admins.
    pub enabled: bool,
    /// At least one binding is mandatory per object.
    pub required: bool,
    /// More than one binding is permitted per object.
    pub allow_multiple: bool,
    /// Bindings may carry arbitrary strings with no backing tag.
    pub allow_free_text: bool,
    /// Platform-owned; immune to admin edits.
    pub system_defined: bool,
    /// Display hint for author-facing surfaces.
    pub visible_to_authors: bool,
    /// Behavioral variant key, resolved through the taxonomy registry.
    pub variant: String,
}

impl Taxonomy {
    /// The effective variant key: free-text taxonomies always dispatch to
    /// the free-text variant regardless of the stored key.
    pub fn variant_key(&self) -> &str {
        if self.allow_free_text {
            VARIANT_FREE_TEXT
        } else {
            &self.variant
        }
    }
}

/// Parameters for creating a taxonomy. All flags default to the plain
/// closed-vocabulary taxonomy an admin would create from scratch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyParams {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub allow_multiple: bool,
    #[serde(default)]
    pub allow_free_text: bool,
    #[serde(default)]
    pub system_defined: bool,
    #[serde(default = "default_true")]
    pub visible_to_authors: bool,
    #[serde(default = "default_variant")]
    pub variant: String,
}

fn default_true() -> bool {
    true
}

fn default_variant() -> String {
    VARIANT_CLOSED.to_string()
}

impl TaxonomyParams {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            enabled: true,
            required: false,
            allow_multiple: false,
            allow_free_text: false,
            system_defined: false,
            visible_to_authors: true,
            variant: default_variant(),
        }
    }

    pub fn free_text(mut self) -> Self {
        self.allow_free_text = true;
        self
    }

    pub fn multiple(mut self) -> Self {
        self.allow_multiple = true;
        self
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = variant.into();
        self
    }
}
