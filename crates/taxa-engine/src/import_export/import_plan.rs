//! Import planning: diff parsed items against the live tag set.
//!
//! Planning produces a list of simple actions (create, rename, reparent,
//! delete) plus any inconsistencies found. Execution applies the actions
//! in order; callers run it inside a transaction so a failed import leaves
//! the vocabulary untouched.

use rusqlite::Connection;
use rustc_hash::{FxHashMap, FxHashSet};
use taxa_core::errors::TaggingError;
use taxa_core::types::{Tag, TagId, Taxonomy};
use taxa_storage::queries::tags;

use super::parsers::TagItem;

/// One planned vocabulary change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportAction {
    CreateTag {
        id: String,
        value: String,
        parent_id: Option<String>,
    },
    RenameTag {
        tag_id: TagId,
        from: String,
        to: String,
    },
    UpdateParent {
        tag_id: TagId,
        value: String,
        parent_id: Option<String>,
    },
    DeleteTag {
        tag_id: TagId,
        value: String,
    },
}

impl std::fmt::Display for ImportAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateTag { id, value, parent_id } => match parent_id {
                Some(parent) => write!(f, "create tag `{value}` ({id}) under {parent}"),
                None => write!(f, "create tag `{value}` ({id}) at root"),
            },
            Self::RenameTag { from, to, .. } => write!(f, "rename tag `{from}` to `{to}`"),
            Self::UpdateParent { value, parent_id, .. } => match parent_id {
                Some(parent) => write!(f, "move tag `{value}` under {parent}"),
                None => write!(f, "move tag `{value}` to root"),
            },
            Self::DeleteTag { value, .. } => write!(f, "delete tag `{value}`"),
        }
    }
}

/// A generated import plan: the actions to run and the inconsistencies
/// that block execution.
#[derive(Debug)]
pub struct TagImportPlan {
    pub actions: Vec<ImportAction>,
    pub errors: Vec<String>,
}

impl TagImportPlan {
    /// Diff `items` against the stored vocabulary.
    ///
    /// With `replace`, stored tags absent from the file are deleted, so a
    /// parent reference is only valid if the parent itself appears in the
    /// file (or survives the replace).
    pub fn generate_actions(
        conn: &Connection,
        taxonomy: &Taxonomy,
        items: &[TagItem],
        replace: bool,
    ) -> Result<Self, TaggingError> {
        let existing = tags::all_tags_flat(conn, taxonomy.id)?;
        let by_external: FxHashMap<&str, &Tag> = existing
            .iter()
            .filter_map(|tag| tag.external_id.as_deref().map(|ext| (ext, tag)))
            .collect();
        let by_id: FxHashMap<TagId, &Tag> = existing
            .iter()
            .filter_map(|tag| tag.id.map(|id| (id, tag)))
            .collect();

        let item_ids: FxHashSet<&str> = items.iter().map(|item| item.id.as_str()).collect();

        let mut actions = Vec::new();
        let mut errors = Vec::new();
        let mut seen_ids: FxHashSet<&str> = FxHashSet::default();

        for item in items {
            if !seen_ids.insert(item.id.as_str()) {
                errors.push(format!("duplicated external id `{}`", item.id));
                continue;
            }

            if let Some(parent_ext) = item.parent_id.as_deref() {
                let parent_in_file = item_ids.contains(parent_ext);
                let parent_stored = by_external.contains_key(parent_ext);
                let parent_ok = if replace {
                    // Stored parents missing from the file get deleted.
                    parent_in_file
                } else {
                    parent_in_file || parent_stored
                };
                if !parent_ok {
                    errors.push(format!(
                        "tag `{}` references unknown parent `{parent_ext}`",
                        item.id
                    ));
                    continue;
                }
            }

            match by_external.get(item.id.as_str()) {
                None => actions.push(ImportAction::CreateTag {
                    id: item.id.clone(),
                    value: item.value.clone(),
                    parent_id: item.parent_id.clone(),
                }),
                Some(stored) => {
                    let Some(tag_id) = stored.id else {
                        continue;
                    };
                    if stored.value != item.value {
                        actions.push(ImportAction::RenameTag {
                            tag_id,
                            from: stored.value.clone(),
                            to: item.value.clone(),
                        });
                    }
                    let stored_parent_ext = stored
                        .parent_id
                        .and_then(|pid| by_id.get(&pid))
                        .and_then(|parent| parent.external_id.clone());
                    if stored_parent_ext.as_deref() != item.parent_id.as_deref() {
                        actions.push(ImportAction::UpdateParent {
                            tag_id,
                            value: item.value.clone(),
                            parent_id: item.parent_id.clone(),
                        });
                    }
                }
            }
        }

        if replace {
            for tag in &existing {
                let keep = tag
                    .external_id
                    .as_deref()
                    .is_some_and(|ext| item_ids.contains(ext));
                if !keep {
                    let Some(tag_id) = tag.id else {
                        continue;
                    };
                    actions.push(ImportAction::DeleteTag {
                        tag_id,
                        value: tag.value.clone(),
                    });
                }
            }
        }

        Ok(Self { actions, errors })
    }

    /// Render the plan as a numbered human-readable listing.
    pub fn plan(&self) -> String {
        let mut out = String::new();
        for (index, action) in self.actions.iter().enumerate() {
            out.push_str(&format!("{}. {action}\n", index + 1));
        }
        for error in &self.errors {
            out.push_str(&format!("error: {error}\n"));
        }
        if self.actions.is_empty() && self.errors.is_empty() {
            out.push_str("no changes\n");
        }
        out
    }

    /// Apply the actions in order. Callers wrap this in a transaction.
    pub fn execute(&self, conn: &Connection, taxonomy: &Taxonomy) -> Result<usize, TaggingError> {
        // External-id → row-id map covering both stored and newly created
        // tags, so creates can resolve parents from earlier actions.
        let mut id_map: FxHashMap<String, TagId> = tags::all_tags_flat(conn, taxonomy.id)?
            .into_iter()
            .filter_map(|tag| match (tag.external_id, tag.id) {
                (Some(ext), Some(id)) => Some((ext, id)),
                _ => None,
            })
            .collect();

        for action in &self.actions {
            match action {
                ImportAction::CreateTag { id, value, parent_id } => {
                    let parent = parent_id.as_ref().and_then(|ext| id_map.get(ext)).copied();
                    let tag = tags::insert_tag(conn, taxonomy.id, value, parent, Some(id))?;
                    if let Some(tag_id) = tag.id {
                        id_map.insert(id.clone(), tag_id);
                    }
                }
                ImportAction::RenameTag { tag_id, to, .. } => {
                    tags::update_tag_value(conn, *tag_id, to)?;
                }
                ImportAction::UpdateParent { tag_id, parent_id, .. } => {
                    let parent = parent_id.as_ref().and_then(|ext| id_map.get(ext)).copied();
                    tags::update_tag_parent(conn, *tag_id, parent)?;
                }
                ImportAction::DeleteTag { tag_id, .. } => {
                    tags::delete_tag(conn, *tag_id)?;
                }
            }
        }

        Ok(self.actions.len())
    }
}
