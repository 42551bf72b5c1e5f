//! tag_import_task queries.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use taxa_core::errors::StorageError;
use taxa_core::types::TaxonomyId;

use super::util::sqlite_err;

/// Lifecycle states of an import task. `Success` and `Error` are terminal;
/// a taxonomy may only have one non-terminal task at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportTaskStatus {
    Planning,
    Executing,
    Success,
    Error,
}

impl ImportTaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Executing => "executing",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "planning" => Some(Self::Planning),
            "executing" => Some(Self::Executing),
            "success" => Some(Self::Success),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }
}

/// An import task row: status plus an append-only execution log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportTaskRecord {
    pub id: i64,
    pub taxonomy_id: TaxonomyId,
    pub status: ImportTaskStatus,
    pub log: String,
    pub creation_date: i64,
}

fn map_task(row: &Row<'_>) -> rusqlite::Result<ImportTaskRecord> {
    let status_text: String = row.get(2)?;
    Ok(ImportTaskRecord {
        id: row.get(0)?,
        taxonomy_id: TaxonomyId::new(row.get(1)?),
        status: ImportTaskStatus::parse(&status_text).unwrap_or(ImportTaskStatus::Error),
        log: row.get(3)?,
        creation_date: row.get(4)?,
    })
}

/// Create a task in the planning state.
pub fn create_task(
    conn: &Connection,
    taxonomy_id: TaxonomyId,
) -> Result<ImportTaskRecord, StorageError> {
    conn.execute(
        "INSERT INTO tag_import_task (taxonomy_id, status) VALUES (?1, 'planning')",
        params![taxonomy_id.inner()],
    )
    .map_err(sqlite_err)?;

    let id = conn.last_insert_rowid();
    get_task(conn, id)?.ok_or(StorageError::NotFound {
        entity: "tag_import_task",
        id,
    })
}

/// Get a task by id.
pub fn get_task(conn: &Connection, id: i64) -> Result<Option<ImportTaskRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, taxonomy_id, status, log, creation_date
             FROM tag_import_task WHERE id = ?1",
        )
        .map_err(sqlite_err)?;

    let mut rows = stmt.query_map(params![id], map_task).map_err(sqlite_err)?;
    match rows.next() {
        Some(Ok(task)) => Ok(Some(task)),
        Some(Err(e)) => Err(sqlite_err(e)),
        None => Ok(None),
    }
}

/// The most recent task for a taxonomy, if any.
pub fn last_task_for_taxonomy(
    conn: &Connection,
    taxonomy_id: TaxonomyId,
) -> Result<Option<ImportTaskRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, taxonomy_id, status, log, creation_date
             FROM tag_import_task WHERE taxonomy_id = ?1
             ORDER BY creation_date DESC, id DESC LIMIT 1",
        )
        .map_err(sqlite_err)?;

    let mut rows = stmt
        .query_map(params![taxonomy_id.inner()], map_task)
        .map_err(sqlite_err)?;
    match rows.next() {
        Some(Ok(task)) => Ok(Some(task)),
        Some(Err(e)) => Err(sqlite_err(e)),
        None => Ok(None),
    }
}

/// Append a line to the task log.
pub fn append_log(conn: &Connection, id: i64, line: &str) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE tag_import_task SET log = log || ?1 || char(10) WHERE id = ?2",
        params![line, id],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

/// Move the task to a new lifecycle state.
pub fn set_status(
    conn: &Connection,
    id: i64,
    status: ImportTaskStatus,
) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE tag_import_task SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )
    .map_err(sqlite_err)?;
    Ok(())
}
