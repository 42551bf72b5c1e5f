//! Tag import/export.
//!
//! Pipeline: parse → plan → execute, with a per-taxonomy task row logging
//! each step. Only one non-terminal task may exist per taxonomy, and
//! free-text or system-defined taxonomies cannot be imported into at all.

pub mod import_plan;
pub mod parsers;

use rusqlite::TransactionBehavior;
use taxa_core::errors::{StorageError, TaggingError};
use taxa_core::types::{Taxonomy, TaxonomyId};
use taxa_storage::queries::import_tasks::{self, ImportTaskRecord, ImportTaskStatus};
use taxa_storage::queries::tags;

pub use import_plan::{ImportAction, TagImportPlan};
pub use parsers::{ParserFormat, TagItem};

/// Outcome of an import run: success flag, the task row, and the plan
/// (absent when parsing failed).
pub type ImportOutcome = (bool, ImportTaskRecord, Option<TagImportPlan>);

impl crate::TaggingEngine {
    /// Import tags from a file into a closed taxonomy.
    ///
    /// With `replace`, stored tags absent from the file are deleted. With
    /// `plan_only`, the plan is generated and logged but not executed.
    /// Parse or plan errors end the task in the error state and return
    /// `false`; the vocabulary is only touched by a fully successful
    /// execution.
    pub fn import_tags(
        &self,
        taxonomy: &Taxonomy,
        data: &[u8],
        format: ParserFormat,
        replace: bool,
        plan_only: bool,
    ) -> Result<ImportOutcome, TaggingError> {
        validate_importable(taxonomy)?;

        self.db().with_writer(|conn| {
            if let Some(last) = import_tasks::last_task_for_taxonomy(conn, taxonomy.id)? {
                if !last.status.is_terminal() {
                    return Err(TaggingError::ImportInProgress {
                        taxonomy: taxonomy.name.clone(),
                    });
                }
            }

            let task = import_tasks::create_task(conn, taxonomy.id)?;
            import_tasks::append_log(conn, task.id, "starting import parse")?;

            let (items, parse_errors) = match format {
                ParserFormat::Json => parsers::parse_json(data),
            };
            if !parse_errors.is_empty() {
                for error in &parse_errors {
                    import_tasks::append_log(conn, task.id, &format!("parse error: {error}"))?;
                }
                import_tasks::set_status(conn, task.id, ImportTaskStatus::Error)?;
                let task = reload_task(conn, task.id)?;
                return Ok((false, task, None));
            }

            import_tasks::append_log(conn, task.id, "generating actions")?;
            let plan = TagImportPlan::generate_actions(conn, taxonomy, &items, replace)?;
            import_tasks::append_log(conn, task.id, &plan.plan())?;

            if !plan.errors.is_empty() {
                import_tasks::set_status(conn, task.id, ImportTaskStatus::Error)?;
                let task = reload_task(conn, task.id)?;
                return Ok((false, task, Some(plan)));
            }

            if !plan_only {
                import_tasks::set_status(conn, task.id, ImportTaskStatus::Executing)?;
                match execute_plan(conn, taxonomy, &plan) {
                    Ok(applied) => {
                        import_tasks::append_log(
                            conn,
                            task.id,
                            &format!("applied {applied} actions"),
                        )?;
                        tracing::info!(taxonomy = %taxonomy.id, applied, "imported tags");
                    }
                    // A failed execution rolls back and must still land the
                    // task in a terminal state, or it would block every
                    // future import for this taxonomy.
                    Err(e) => {
                        import_tasks::append_log(conn, task.id, &format!("execute error: {e}"))?;
                        import_tasks::set_status(conn, task.id, ImportTaskStatus::Error)?;
                        let task = reload_task(conn, task.id)?;
                        return Ok((false, task, Some(plan)));
                    }
                }
            }

            import_tasks::set_status(conn, task.id, ImportTaskStatus::Success)?;
            let task = reload_task(conn, task.id)?;
            Ok((true, task, Some(plan)))
        })
    }

    /// Export a taxonomy's stored tags as a string in the given format.
    pub fn export_tags(
        &self,
        taxonomy: &Taxonomy,
        format: ParserFormat,
    ) -> Result<String, TaggingError> {
        self.db().with_reader(|conn| {
            let stored = tags::all_tags_flat(conn, taxonomy.id)?;
            let by_id: rustc_hash::FxHashMap<_, _> = stored
                .iter()
                .filter_map(|tag| tag.id.map(|id| (id, tag)))
                .collect();

            let items: Vec<TagItem> = stored
                .iter()
                .filter_map(|tag| {
                    let id = tag.id?;
                    Some(TagItem {
                        id: tag
                            .external_id
                            .clone()
                            .unwrap_or_else(|| id.inner().to_string()),
                        value: tag.value.clone(),
                        parent_id: tag.parent_id.and_then(|pid| {
                            let parent = by_id.get(&pid)?;
                            Some(
                                parent
                                    .external_id
                                    .clone()
                                    .unwrap_or_else(|| pid.inner().to_string()),
                            )
                        }),
                    })
                })
                .collect();

            match format {
                ParserFormat::Json => Ok(parsers::export_json(&items)),
            }
        })
    }

    /// Status of the most recent import task for a taxonomy.
    pub fn get_last_import_status(
        &self,
        taxonomy_id: TaxonomyId,
    ) -> Result<Option<ImportTaskStatus>, TaggingError> {
        Ok(self.db().with_reader(|conn| {
            import_tasks::last_task_for_taxonomy(conn, taxonomy_id)
        })?
        .map(|task| task.status))
    }

    /// Log of the most recent import task for a taxonomy.
    pub fn get_last_import_log(
        &self,
        taxonomy_id: TaxonomyId,
    ) -> Result<Option<String>, TaggingError> {
        Ok(self.db().with_reader(|conn| {
            import_tasks::last_task_for_taxonomy(conn, taxonomy_id)
        })?
        .map(|task| task.log))
    }
}

fn execute_plan(
    conn: &mut rusqlite::Connection,
    taxonomy: &Taxonomy,
    plan: &TagImportPlan,
) -> Result<usize, TaggingError> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;
    let applied = plan.execute(&tx, taxonomy)?;
    tx.commit().map_err(|e| StorageError::SqliteError {
        message: e.to_string(),
    })?;
    Ok(applied)
}

fn validate_importable(taxonomy: &Taxonomy) -> Result<(), TaggingError> {
    if taxonomy.allow_free_text {
        return Err(TaggingError::ImportNotAllowed {
            taxonomy: taxonomy.name.clone(),
            reason: "free-text taxonomies have no tag tree to import into".to_string(),
        });
    }
    if taxonomy.system_defined {
        return Err(TaggingError::ImportNotAllowed {
            taxonomy: taxonomy.name.clone(),
            reason: "system-defined taxonomies are platform-owned".to_string(),
        });
    }
    Ok(())
}

fn reload_task(
    conn: &rusqlite::Connection,
    id: i64,
) -> Result<ImportTaskRecord, StorageError> {
    import_tasks::get_task(conn, id)?.ok_or(StorageError::NotFound {
        entity: "tag_import_task",
        id,
    })
}
