//! V002: tag import task log.

pub const MIGRATION_SQL: &str = r#"
-- One row per import run, with an append-only execution log. At most one
-- non-terminal task per taxonomy is allowed at a time (enforced by the
-- engine, not the schema).
CREATE TABLE IF NOT EXISTS tag_import_task (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    taxonomy_id INTEGER NOT NULL REFERENCES taxonomy(id) ON DELETE CASCADE,
    status TEXT NOT NULL DEFAULT 'planning',
    log TEXT NOT NULL DEFAULT '',
    creation_date INTEGER NOT NULL DEFAULT (unixepoch())
) STRICT;

CREATE INDEX IF NOT EXISTS idx_import_task_taxonomy
    ON tag_import_task(taxonomy_id, creation_date);
"#;
