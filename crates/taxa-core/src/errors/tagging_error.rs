//! Tagging engine errors.

use super::config_error::ConfigError;
use super::error_code::{self, ErrorCode};
use super::storage_error::StorageError;

/// Errors raised by taxonomy, tag, and object-tag operations.
///
/// Every binding-policy and resolution error aborts the whole operation
/// with no partial writes. Permission denials are booleans, not errors.
#[derive(Debug, thiserror::Error)]
pub enum TaggingError {
    /// The boundary handed us something other than a list of strings.
    #[error("tags must be a list, not {type_name}")]
    TagsNotAList { type_name: &'static str },

    #[error("tag `{value}` does not exist in this taxonomy")]
    TagDoesNotExist { value: String },

    #[error("tag `{value}` already exists under this parent")]
    TagAlreadyExists { value: String },

    #[error("taxonomy `{taxonomy}` {message}")]
    PolicyViolation { taxonomy: String, message: String },

    #[error("cannot add more than {cap} tags to object `{object_id}`")]
    TagLimitExceeded { cap: usize, object_id: String },

    #[error("taxonomy `{taxonomy}` does not support autocomplete")]
    AutocompleteUnsupported { taxonomy: String },

    #[error("taxonomy `{taxonomy}` has an import task running; only one task per taxonomy can run at a time")]
    ImportInProgress { taxonomy: String },

    #[error("cannot import into taxonomy `{taxonomy}`: {reason}")]
    ImportNotAllowed { taxonomy: String, reason: String },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl TaggingError {
    /// Cardinality violation: more than one value for a single-tag taxonomy.
    pub fn only_one_tag(taxonomy: &str) -> Self {
        Self::PolicyViolation {
            taxonomy: taxonomy.to_string(),
            message: "only allows one tag per object".to_string(),
        }
    }

    /// Required-but-empty violation.
    pub fn at_least_one_tag(taxonomy: &str) -> Self {
        Self::PolicyViolation {
            taxonomy: taxonomy.to_string(),
            message: "requires at least one tag per object".to_string(),
        }
    }
}

impl ErrorCode for TaggingError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::TagsNotAList { .. } => error_code::TYPE_MISMATCH,
            Self::TagDoesNotExist { .. } => error_code::TAG_DOES_NOT_EXIST,
            Self::TagAlreadyExists { .. } => error_code::TAG_ALREADY_EXISTS,
            Self::PolicyViolation { .. } | Self::TagLimitExceeded { .. } => {
                error_code::POLICY_VIOLATION
            }
            Self::AutocompleteUnsupported { .. } => error_code::NOT_IMPLEMENTED,
            Self::ImportInProgress { .. } | Self::ImportNotAllowed { .. } => {
                error_code::IMPORT_ERROR
            }
            Self::Storage(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
        }
    }
}
