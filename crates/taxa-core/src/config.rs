//! Runtime configuration for the tagging engine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_OBJECT_TAGS, DEFAULT_TREE_DEPTH_LIMIT};
use crate::errors::ConfigError;

/// Configuration for the tagging engine.
///
/// Both limits are deployment-configurable; the defaults are the platform
/// reference values.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TaggingConfig {
    /// Cap on bindings per object across all taxonomies. Default: 100.
    pub max_object_tags: Option<usize>,
    /// Depth ceiling for full-taxonomy hierarchy listings. Default: 3.
    pub tree_depth_limit: Option<usize>,
}

impl TaggingConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let config: Self = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded tagging config");
        Ok(config)
    }

    /// Returns the effective per-object tag cap, defaulting to 100.
    pub fn effective_max_object_tags(&self) -> usize {
        self.max_object_tags.unwrap_or(DEFAULT_MAX_OBJECT_TAGS)
    }

    /// Returns the effective depth ceiling, defaulting to 3.
    pub fn effective_tree_depth_limit(&self) -> usize {
        self.tree_depth_limit.unwrap_or(DEFAULT_TREE_DEPTH_LIMIT)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_object_tags == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "max_object_tags".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.tree_depth_limit == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "tree_depth_limit".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
