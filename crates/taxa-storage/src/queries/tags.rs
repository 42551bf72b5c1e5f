//! tag CRUD and hierarchy queries.
//!
//! Sibling ordering is by value with SQLite's BINARY collation
//! (case-sensitive); search filters use LIKE, which is
//! ASCII-case-insensitive, matching the search contract.

use rusqlite::{params, Connection, Row};
use taxa_core::errors::StorageError;
use taxa_core::types::{Tag, TagId, TaxonomyId};

use super::util::{contains_pattern, sqlite_err};

const TAG_COLUMNS: &str = "id, taxonomy_id, parent_id, value, external_id";

fn map_tag(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: Some(TagId::new(row.get(0)?)),
        taxonomy_id: TaxonomyId::new(row.get(1)?),
        parent_id: row.get::<_, Option<i64>>(2)?.map(TagId::new),
        value: row.get(3)?,
        external_id: row.get(4)?,
    })
}

fn collect_tags(
    stmt: &mut rusqlite::CachedStatement<'_>,
    params: impl rusqlite::Params,
) -> Result<Vec<Tag>, StorageError> {
    let rows = stmt.query_map(params, map_tag).map_err(sqlite_err)?;
    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(sqlite_err)?);
    }
    Ok(result)
}

/// Insert a tag and return the stored record.
pub fn insert_tag(
    conn: &Connection,
    taxonomy_id: TaxonomyId,
    value: &str,
    parent_id: Option<TagId>,
    external_id: Option<&str>,
) -> Result<Tag, StorageError> {
    conn.execute(
        "INSERT INTO tag (taxonomy_id, parent_id, value, external_id)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            taxonomy_id.inner(),
            parent_id.map(TagId::inner),
            value,
            external_id,
        ],
    )
    .map_err(sqlite_err)?;

    let id = conn.last_insert_rowid();
    get_tag(conn, TagId::new(id))?.ok_or(StorageError::NotFound { entity: "tag", id })
}

/// Get a tag by id.
pub fn get_tag(conn: &Connection, id: TagId) -> Result<Option<Tag>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!("SELECT {TAG_COLUMNS} FROM tag WHERE id = ?1"))
        .map_err(sqlite_err)?;

    let mut rows = stmt
        .query_map(params![id.inner()], map_tag)
        .map_err(sqlite_err)?;

    match rows.next() {
        Some(Ok(tag)) => Ok(Some(tag)),
        Some(Err(e)) => Err(sqlite_err(e)),
        None => Ok(None),
    }
}

/// Find a tag anywhere in a taxonomy by exact value. Used for value
/// resolution and resync repair.
pub fn find_tag_by_value(
    conn: &Connection,
    taxonomy_id: TaxonomyId,
    value: &str,
) -> Result<Option<Tag>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {TAG_COLUMNS} FROM tag
             WHERE taxonomy_id = ?1 AND value = ?2
             ORDER BY id LIMIT 1"
        ))
        .map_err(sqlite_err)?;

    let mut rows = stmt
        .query_map(params![taxonomy_id.inner(), value], map_tag)
        .map_err(sqlite_err)?;

    match rows.next() {
        Some(Ok(tag)) => Ok(Some(tag)),
        Some(Err(e)) => Err(sqlite_err(e)),
        None => Ok(None),
    }
}

/// Find a tag by its stable external key.
pub fn find_tag_by_external_id(
    conn: &Connection,
    taxonomy_id: TaxonomyId,
    external_id: &str,
) -> Result<Option<Tag>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {TAG_COLUMNS} FROM tag
             WHERE taxonomy_id = ?1 AND external_id = ?2"
        ))
        .map_err(sqlite_err)?;

    let mut rows = stmt
        .query_map(params![taxonomy_id.inner(), external_id], map_tag)
        .map_err(sqlite_err)?;

    match rows.next() {
        Some(Ok(tag)) => Ok(Some(tag)),
        Some(Err(e)) => Err(sqlite_err(e)),
        None => Ok(None),
    }
}

/// Find a tag among the direct children of one parent (root when None) by
/// exact value. Used for sibling-uniqueness checks.
pub fn find_sibling_by_value(
    conn: &Connection,
    taxonomy_id: TaxonomyId,
    parent_id: Option<TagId>,
    value: &str,
) -> Result<Option<Tag>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {TAG_COLUMNS} FROM tag
             WHERE taxonomy_id = ?1 AND COALESCE(parent_id, 0) = ?2 AND value = ?3"
        ))
        .map_err(sqlite_err)?;

    let parent_raw = parent_id.map_or(0, TagId::inner);
    let mut rows = stmt
        .query_map(params![taxonomy_id.inner(), parent_raw, value], map_tag)
        .map_err(sqlite_err)?;

    match rows.next() {
        Some(Ok(tag)) => Ok(Some(tag)),
        Some(Err(e)) => Err(sqlite_err(e)),
        None => Ok(None),
    }
}

/// Direct children of a parent (roots when None), siblings ordered by
/// value, optionally filtered by a case-insensitive substring.
pub fn children_of(
    conn: &Connection,
    taxonomy_id: TaxonomyId,
    parent_id: Option<TagId>,
    search_term: Option<&str>,
) -> Result<Vec<Tag>, StorageError> {
    let mut sql = format!(
        "SELECT {TAG_COLUMNS} FROM tag
         WHERE taxonomy_id = ?1 AND COALESCE(parent_id, 0) = ?2"
    );
    if search_term.is_some() {
        sql.push_str(" AND value LIKE ?3 ESCAPE '\\'");
    }
    sql.push_str(" ORDER BY value");

    let mut stmt = conn.prepare_cached(&sql).map_err(sqlite_err)?;
    let parent_raw = parent_id.map_or(0, TagId::inner);
    match search_term {
        Some(term) => collect_tags(
            &mut stmt,
            params![taxonomy_id.inner(), parent_raw, contains_pattern(term)],
        ),
        None => collect_tags(&mut stmt, params![taxonomy_id.inner(), parent_raw]),
    }
}

/// All tags whose parent is in `parents`, ordered by value across the
/// whole level. This is one step of the level-by-level hierarchy walk.
pub fn children_of_many(
    conn: &Connection,
    taxonomy_id: TaxonomyId,
    parents: &[TagId],
    search_term: Option<&str>,
) -> Result<Vec<Tag>, StorageError> {
    if parents.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; parents.len()].join(", ");
    let mut sql = format!(
        "SELECT {TAG_COLUMNS} FROM tag
         WHERE taxonomy_id = ? AND parent_id IN ({placeholders})"
    );
    if search_term.is_some() {
        sql.push_str(" AND value LIKE ? ESCAPE '\\'");
    }
    sql.push_str(" ORDER BY value");

    let mut stmt = conn.prepare(&sql).map_err(sqlite_err)?;

    let mut bound: Vec<Box<dyn rusqlite::ToSql>> = Vec::with_capacity(parents.len() + 2);
    bound.push(Box::new(taxonomy_id.inner()));
    for parent in parents {
        bound.push(Box::new(parent.inner()));
    }
    if let Some(term) = search_term {
        bound.push(Box::new(contains_pattern(term)));
    }

    let rows = stmt
        .query_map(
            rusqlite::params_from_iter(bound.iter().map(|p| p.as_ref())),
            map_tag,
        )
        .map_err(sqlite_err)?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(sqlite_err)?);
    }
    Ok(result)
}

/// Ancestors of a tag, root-first, immediate parent last. Lineage lookup
/// is lookup-by-id, bounded by `max_depth` so a corrupted parent chain
/// cannot loop forever.
pub fn ancestors_of(
    conn: &Connection,
    tag: &Tag,
    max_depth: usize,
) -> Result<Vec<Tag>, StorageError> {
    let mut ancestors = Vec::new();
    let mut current_parent = tag.parent_id;

    for _ in 0..max_depth {
        let Some(parent_id) = current_parent else {
            break;
        };
        let Some(parent) = get_tag(conn, parent_id)? else {
            break;
        };
        current_parent = parent.parent_id;
        ancestors.push(parent);
    }

    ancestors.reverse();
    Ok(ancestors)
}

/// All stored tags of a taxonomy as a flat list, ordered by value then id.
/// Import/export diffs read this; hierarchy listings use the level walk.
pub fn all_tags_flat(
    conn: &Connection,
    taxonomy_id: TaxonomyId,
) -> Result<Vec<Tag>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {TAG_COLUMNS} FROM tag WHERE taxonomy_id = ?1 ORDER BY value, id"
        ))
        .map_err(sqlite_err)?;
    collect_tags(&mut stmt, params![taxonomy_id.inner()])
}

/// Update a tag's display value.
pub fn update_tag_value(conn: &Connection, id: TagId, value: &str) -> Result<(), StorageError> {
    let changed = conn
        .execute(
            "UPDATE tag SET value = ?1 WHERE id = ?2",
            params![value, id.inner()],
        )
        .map_err(sqlite_err)?;

    if changed == 0 {
        return Err(StorageError::NotFound {
            entity: "tag",
            id: id.inner(),
        });
    }
    Ok(())
}

/// Move a tag under a new parent (root when None).
pub fn update_tag_parent(
    conn: &Connection,
    id: TagId,
    parent_id: Option<TagId>,
) -> Result<(), StorageError> {
    let changed = conn
        .execute(
            "UPDATE tag SET parent_id = ?1 WHERE id = ?2",
            params![parent_id.map(TagId::inner), id.inner()],
        )
        .map_err(sqlite_err)?;

    if changed == 0 {
        return Err(StorageError::NotFound {
            entity: "tag",
            id: id.inner(),
        });
    }
    Ok(())
}

/// Delete a tag (children cascade). Bindings that reference it keep their
/// dangling tag_id and denormalized value. Returns false when no such tag
/// existed.
pub fn delete_tag(conn: &Connection, id: TagId) -> Result<bool, StorageError> {
    let changed = conn
        .execute("DELETE FROM tag WHERE id = ?1", params![id.inner()])
        .map_err(sqlite_err)?;
    Ok(changed > 0)
}

/// Distinct tag values matching a case-insensitive substring, ordered by
/// value, each carrying the lowest matching tag id (first occurrence
/// wins). Closed-vocabulary autocomplete reads these.
pub fn search_values(
    conn: &Connection,
    taxonomy_id: TaxonomyId,
    search_term: &str,
) -> Result<Vec<(String, TagId)>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT value, MIN(id) FROM tag
             WHERE taxonomy_id = ?1 AND value LIKE ?2 ESCAPE '\\'
             GROUP BY value
             ORDER BY value",
        )
        .map_err(sqlite_err)?;

    let rows = stmt
        .query_map(
            params![taxonomy_id.inner(), contains_pattern(search_term)],
            |row| Ok((row.get::<_, String>(0)?, TagId::new(row.get(1)?))),
        )
        .map_err(sqlite_err)?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(sqlite_err)?);
    }
    Ok(result)
}

/// Get or create the stored row materializing an external enumeration
/// entry. The external id is the stable key; the display value is
/// refreshed to the enumeration's current spelling on every call.
pub fn materialize_external_tag(
    conn: &Connection,
    taxonomy_id: TaxonomyId,
    external_id: &str,
    value: &str,
) -> Result<Tag, StorageError> {
    if let Some(existing) = find_tag_by_external_id(conn, taxonomy_id, external_id)? {
        if existing.value != value {
            if let Some(id) = existing.id {
                update_tag_value(conn, id, value)?;
            }
            return Ok(Tag {
                value: value.to_string(),
                ..existing
            });
        }
        return Ok(existing);
    }
    insert_tag(conn, taxonomy_id, value, None, Some(external_id))
}
