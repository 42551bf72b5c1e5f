//! taxonomy CRUD queries.

use rusqlite::{params, Connection, Row};
use taxa_core::errors::StorageError;
use taxa_core::types::{Taxonomy, TaxonomyId, TaxonomyParams};

use super::util::sqlite_err;

fn map_taxonomy(row: &Row<'_>) -> rusqlite::Result<Taxonomy> {
    Ok(Taxonomy {
        id: TaxonomyId::new(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        enabled: row.get(3)?,
        required: row.get(4)?,
        allow_multiple: row.get(5)?,
        allow_free_text: row.get(6)?,
        system_defined: row.get(7)?,
        visible_to_authors: row.get(8)?,
        variant: row.get(9)?,
    })
}

const TAXONOMY_COLUMNS: &str = "id, name, description, enabled, required, allow_multiple, \
     allow_free_text, system_defined, visible_to_authors, variant";

/// Insert a taxonomy and return the stored record.
pub fn insert_taxonomy(
    conn: &Connection,
    params_in: &TaxonomyParams,
) -> Result<Taxonomy, StorageError> {
    conn.execute(
        "INSERT INTO taxonomy (name, description, enabled, required, allow_multiple,
                               allow_free_text, system_defined, visible_to_authors, variant)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            params_in.name,
            params_in.description,
            params_in.enabled,
            params_in.required,
            params_in.allow_multiple,
            params_in.allow_free_text,
            params_in.system_defined,
            params_in.visible_to_authors,
            params_in.variant,
        ],
    )
    .map_err(sqlite_err)?;

    let id = conn.last_insert_rowid();
    get_taxonomy(conn, TaxonomyId::new(id))?.ok_or(StorageError::NotFound {
        entity: "taxonomy",
        id,
    })
}

/// Get a taxonomy by id.
pub fn get_taxonomy(
    conn: &Connection,
    id: TaxonomyId,
) -> Result<Option<Taxonomy>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {TAXONOMY_COLUMNS} FROM taxonomy WHERE id = ?1"
        ))
        .map_err(sqlite_err)?;

    let mut rows = stmt
        .query_map(params![id.inner()], map_taxonomy)
        .map_err(sqlite_err)?;

    match rows.next() {
        Some(Ok(record)) => Ok(Some(record)),
        Some(Err(e)) => Err(sqlite_err(e)),
        None => Ok(None),
    }
}

/// List taxonomies, optionally filtered by the enabled flag, ordered by
/// name then id. Each taxonomy appears once regardless of tag count.
pub fn list_taxonomies(
    conn: &Connection,
    enabled: Option<bool>,
) -> Result<Vec<Taxonomy>, StorageError> {
    let (sql, filter): (String, Vec<bool>) = match enabled {
        Some(flag) => (
            format!(
                "SELECT {TAXONOMY_COLUMNS} FROM taxonomy WHERE enabled = ?1 ORDER BY name, id"
            ),
            vec![flag],
        ),
        None => (
            format!("SELECT {TAXONOMY_COLUMNS} FROM taxonomy ORDER BY name, id"),
            vec![],
        ),
    };

    let mut stmt = conn.prepare_cached(&sql).map_err(sqlite_err)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(filter), map_taxonomy)
        .map_err(sqlite_err)?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(sqlite_err)?);
    }
    Ok(result)
}

/// Update the mutable fields of a taxonomy.
pub fn update_taxonomy(conn: &Connection, taxonomy: &Taxonomy) -> Result<(), StorageError> {
    let changed = conn
        .execute(
            "UPDATE taxonomy
             SET name = ?1, description = ?2, enabled = ?3, required = ?4,
                 allow_multiple = ?5, allow_free_text = ?6, visible_to_authors = ?7,
                 variant = ?8
             WHERE id = ?9",
            params![
                taxonomy.name,
                taxonomy.description,
                taxonomy.enabled,
                taxonomy.required,
                taxonomy.allow_multiple,
                taxonomy.allow_free_text,
                taxonomy.visible_to_authors,
                taxonomy.variant,
                taxonomy.id.inner(),
            ],
        )
        .map_err(sqlite_err)?;

    if changed == 0 {
        return Err(StorageError::NotFound {
            entity: "taxonomy",
            id: taxonomy.id.inner(),
        });
    }
    Ok(())
}

/// Delete a taxonomy. Tags cascade; bindings keep their value and lose the
/// taxonomy link. Returns false when no such taxonomy existed.
pub fn delete_taxonomy(conn: &Connection, id: TaxonomyId) -> Result<bool, StorageError> {
    let changed = conn
        .execute("DELETE FROM taxonomy WHERE id = ?1", params![id.inner()])
        .map_err(sqlite_err)?;
    Ok(changed > 0)
}
