//! object_tag binding queries.
//!
//! `is_deleted` is computed in SQL (tag_id set but the tag row missing),
//! never stored. The engine layer owns the replace-set orchestration;
//! these are the primitives it composes inside a transaction.

use rusqlite::{params, Connection, Row};
use taxa_core::errors::StorageError;
use taxa_core::types::{ObjectTag, ObjectTagId, TagId, TaxonomyId};

use super::util::{contains_pattern, sqlite_err};

const OBJECT_TAG_SELECT: &str = "SELECT ot.id, ot.object_id, ot.taxonomy_id, ot.tag_id, ot.value, ot.name, ot.position,
            (ot.tag_id IS NOT NULL AND t.id IS NULL) AS is_deleted
     FROM object_tag ot
     LEFT JOIN tag t ON t.id = ot.tag_id";

fn map_object_tag(row: &Row<'_>) -> rusqlite::Result<ObjectTag> {
    Ok(ObjectTag {
        id: ObjectTagId::new(row.get(0)?),
        object_id: row.get(1)?,
        taxonomy_id: row.get::<_, Option<i64>>(2)?.map(TaxonomyId::new),
        tag_id: row.get::<_, Option<i64>>(3)?.map(TagId::new),
        value: row.get(4)?,
        name: row.get(5)?,
        position: row.get::<_, i64>(6)? as usize,
        is_deleted: row.get(7)?,
    })
}

fn collect_object_tags(
    rows: rusqlite::MappedRows<'_, impl FnMut(&Row<'_>) -> rusqlite::Result<ObjectTag>>,
) -> Result<Vec<ObjectTag>, StorageError> {
    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(sqlite_err)?);
    }
    Ok(result)
}

/// All bindings for an object, optionally narrowed to one taxonomy.
/// Ordered by taxonomy identity (taxonomy-less bindings first), then
/// stored position, then row id.
pub fn get_object_tags(
    conn: &Connection,
    object_id: &str,
    taxonomy_id: Option<TaxonomyId>,
) -> Result<Vec<ObjectTag>, StorageError> {
    const ORDER: &str = " ORDER BY ot.taxonomy_id ASC, ot.position ASC, ot.id ASC";

    match taxonomy_id {
        Some(tid) => {
            let sql =
                format!("{OBJECT_TAG_SELECT} WHERE ot.object_id = ?1 AND ot.taxonomy_id = ?2{ORDER}");
            let mut stmt = conn.prepare_cached(&sql).map_err(sqlite_err)?;
            let rows = stmt
                .query_map(params![object_id, tid.inner()], map_object_tag)
                .map_err(sqlite_err)?;
            collect_object_tags(rows)
        }
        None => {
            let sql = format!("{OBJECT_TAG_SELECT} WHERE ot.object_id = ?1{ORDER}");
            let mut stmt = conn.prepare_cached(&sql).map_err(sqlite_err)?;
            let rows = stmt
                .query_map(params![object_id], map_object_tag)
                .map_err(sqlite_err)?;
            collect_object_tags(rows)
        }
    }
}

/// Count the object's bindings outside one taxonomy. The per-object cap
/// counts these plus the incoming replace set, so an in-place update never
/// trips the cap unless the object's total grows.
pub fn count_other_taxonomy_tags(
    conn: &Connection,
    object_id: &str,
    taxonomy_id: TaxonomyId,
) -> Result<usize, StorageError> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM object_tag
             WHERE object_id = ?1 AND (taxonomy_id IS NULL OR taxonomy_id != ?2)",
            params![object_id, taxonomy_id.inner()],
            |row| row.get(0),
        )
        .map_err(sqlite_err)?;
    Ok(count as usize)
}

/// Insert one binding.
pub fn insert_object_tag(
    conn: &Connection,
    object_id: &str,
    taxonomy_id: TaxonomyId,
    tag_id: Option<TagId>,
    value: &str,
    name: &str,
    position: usize,
) -> Result<ObjectTagId, StorageError> {
    conn.execute(
        "INSERT INTO object_tag (object_id, taxonomy_id, tag_id, value, name, position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            object_id,
            taxonomy_id.inner(),
            tag_id.map(TagId::inner),
            value,
            name,
            position as i64,
        ],
    )
    .map_err(sqlite_err)?;
    Ok(ObjectTagId::new(conn.last_insert_rowid()))
}

/// Rewrite a kept binding for a new replace set: refreshed link, value,
/// name, and position.
pub fn update_object_tag(
    conn: &Connection,
    id: ObjectTagId,
    tag_id: Option<TagId>,
    value: &str,
    name: &str,
    position: usize,
) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE object_tag SET tag_id = ?1, value = ?2, name = ?3, position = ?4 WHERE id = ?5",
        params![
            tag_id.map(TagId::inner),
            value,
            name,
            position as i64,
            id.inner(),
        ],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

/// Delete bindings by id.
pub fn delete_object_tags(conn: &Connection, ids: &[ObjectTagId]) -> Result<usize, StorageError> {
    let mut deleted = 0;
    let mut stmt = conn
        .prepare_cached("DELETE FROM object_tag WHERE id = ?1")
        .map_err(sqlite_err)?;
    for id in ids {
        deleted += stmt.execute(params![id.inner()]).map_err(sqlite_err)?;
    }
    Ok(deleted)
}

/// Bindings whose tag link dangles: tag_id set, tag row gone. These are
/// the resync candidates. Optionally narrowed to specific binding ids.
pub fn list_dangling(
    conn: &Connection,
    ids: Option<&[ObjectTagId]>,
) -> Result<Vec<ObjectTag>, StorageError> {
    let base = format!("{OBJECT_TAG_SELECT} WHERE ot.tag_id IS NOT NULL AND t.id IS NULL");

    match ids {
        None => {
            let sql = format!("{base} ORDER BY ot.id");
            let mut stmt = conn.prepare_cached(&sql).map_err(sqlite_err)?;
            let rows = stmt.query_map([], map_object_tag).map_err(sqlite_err)?;
            collect_object_tags(rows)
        }
        Some(ids) => {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            let placeholders = vec!["?"; ids.len()].join(", ");
            let sql = format!("{base} AND ot.id IN ({placeholders}) ORDER BY ot.id");
            let mut stmt = conn.prepare(&sql).map_err(sqlite_err)?;
            let rows = stmt
                .query_map(
                    rusqlite::params_from_iter(ids.iter().map(|id| id.inner())),
                    map_object_tag,
                )
                .map_err(sqlite_err)?;
            collect_object_tags(rows)
        }
    }
}

/// Re-link a dangling binding to a reappeared tag. The guard repeats the
/// dangling check so the repair is monotonic: a binding whose link became
/// valid since the candidate scan is left untouched. The stored value is
/// never rewritten. Returns true when a row was updated.
pub fn relink_object_tag(
    conn: &Connection,
    id: ObjectTagId,
    new_tag_id: TagId,
) -> Result<bool, StorageError> {
    let changed = conn
        .execute(
            "UPDATE object_tag SET tag_id = ?1
             WHERE id = ?2
               AND tag_id IS NOT NULL
               AND NOT EXISTS (SELECT 1 FROM tag WHERE tag.id = object_tag.tag_id)",
            params![new_tag_id.inner(), id.inner()],
        )
        .map_err(sqlite_err)?;
    Ok(changed > 0)
}

/// Distinct historical binding values for a taxonomy, filtered by a
/// case-insensitive substring, ordered by value. Free-text autocomplete
/// reads these.
pub fn distinct_values(
    conn: &Connection,
    taxonomy_id: TaxonomyId,
    search_term: &str,
) -> Result<Vec<String>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT DISTINCT value FROM object_tag
             WHERE taxonomy_id = ?1 AND value LIKE ?2 ESCAPE '\\'
             ORDER BY value",
        )
        .map_err(sqlite_err)?;

    let rows = stmt
        .query_map(
            params![taxonomy_id.inner(), contains_pattern(search_term)],
            |row| row.get::<_, String>(0),
        )
        .map_err(sqlite_err)?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(sqlite_err)?);
    }
    Ok(result)
}

/// Values already bound to an object under a taxonomy. Autocomplete
/// excludes these when a caller supplies the object.
pub fn values_bound_to_object(
    conn: &Connection,
    taxonomy_id: TaxonomyId,
    object_id: &str,
) -> Result<Vec<String>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT value FROM object_tag
             WHERE taxonomy_id = ?1 AND object_id = ?2",
        )
        .map_err(sqlite_err)?;

    let rows = stmt
        .query_map(params![taxonomy_id.inner(), object_id], |row| {
            row.get::<_, String>(0)
        })
        .map_err(sqlite_err)?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(sqlite_err)?);
    }
    Ok(result)
}
