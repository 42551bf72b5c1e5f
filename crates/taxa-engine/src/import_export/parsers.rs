//! Import/export file formats.
//!
//! One parser per format turns an uploaded file into `TagItem`s and turns
//! a taxonomy's stored tags back into a file. Items are keyed by external
//! id so re-imports update rather than duplicate.

use serde::{Deserialize, Serialize};

/// Supported import/export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserFormat {
    Json,
}

/// One vocabulary entry as it appears in an import file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagItem {
    /// Stable external id for this entry.
    pub id: String,
    /// Display value.
    pub value: String,
    /// External id of the parent entry, when nested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TagFile {
    tags: Vec<TagItem>,
}

/// Parse a JSON import file: `{"tags": [{"id", "value", "parent_id"?}]}`.
/// Returns the parsed items and any format errors; a non-empty error list
/// aborts the import before planning.
pub fn parse_json(data: &[u8]) -> (Vec<TagItem>, Vec<String>) {
    let file: TagFile = match serde_json::from_slice(data) {
        Ok(file) => file,
        Err(e) => return (Vec::new(), vec![format!("invalid JSON: {e}")]),
    };

    let mut errors = Vec::new();
    for (index, item) in file.tags.iter().enumerate() {
        if item.id.trim().is_empty() {
            errors.push(format!("row {}: missing id", index + 1));
        }
        if item.value.trim().is_empty() {
            errors.push(format!("row {}: missing value", index + 1));
        }
        if item.parent_id.as_deref().is_some_and(|p| p.trim().is_empty()) {
            errors.push(format!("row {}: empty parent_id", index + 1));
        }
    }

    if errors.is_empty() {
        (file.tags, errors)
    } else {
        (Vec::new(), errors)
    }
}

/// Render items into the JSON export format.
pub fn export_json(items: &[TagItem]) -> String {
    let file = TagFile {
        tags: items.to_vec(),
    };
    // Serializing a struct of plain strings cannot fail.
    serde_json::to_string_pretty(&file).unwrap_or_default()
}
