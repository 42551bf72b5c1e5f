//! V001: core tables — taxonomy, tag, object_tag.

pub const MIGRATION_SQL: &str = r#"
-- Taxonomies: named, policy-governed vocabularies.
CREATE TABLE IF NOT EXISTS taxonomy (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    enabled INTEGER NOT NULL DEFAULT 1,
    required INTEGER NOT NULL DEFAULT 0,
    allow_multiple INTEGER NOT NULL DEFAULT 0,
    allow_free_text INTEGER NOT NULL DEFAULT 0,
    system_defined INTEGER NOT NULL DEFAULT 0,
    visible_to_authors INTEGER NOT NULL DEFAULT 1,
    variant TEXT NOT NULL DEFAULT 'closed',
    created_at INTEGER NOT NULL DEFAULT (unixepoch())
) STRICT;

CREATE INDEX IF NOT EXISTS idx_taxonomy_name ON taxonomy(name);
CREATE INDEX IF NOT EXISTS idx_taxonomy_enabled ON taxonomy(enabled);

-- Tags: vocabulary entries forming a tree per taxonomy.
CREATE TABLE IF NOT EXISTS tag (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    taxonomy_id INTEGER NOT NULL REFERENCES taxonomy(id) ON DELETE CASCADE,
    parent_id INTEGER REFERENCES tag(id) ON DELETE CASCADE,
    value TEXT NOT NULL,
    external_id TEXT,
    created_at INTEGER NOT NULL DEFAULT (unixepoch())
) STRICT;

-- Sibling values are unique within one parent. NULL parents are collapsed
-- to 0 so root-level siblings are covered too.
CREATE UNIQUE INDEX IF NOT EXISTS uq_tag_siblings
    ON tag(taxonomy_id, COALESCE(parent_id, 0), value);
CREATE UNIQUE INDEX IF NOT EXISTS uq_tag_external_id
    ON tag(taxonomy_id, external_id) WHERE external_id IS NOT NULL;
CREATE INDEX IF NOT EXISTS idx_tag_taxonomy_parent ON tag(taxonomy_id, parent_id);
CREATE INDEX IF NOT EXISTS idx_tag_value ON tag(taxonomy_id, value);

-- Object-tag bindings. taxonomy_id is nullable: a binding may outlive its
-- taxonomy. tag_id carries NO foreign key: tag deletion must leave the
-- reference dangling, observable as is_deleted and repairable by resync.
CREATE TABLE IF NOT EXISTS object_tag (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    object_id TEXT NOT NULL,
    taxonomy_id INTEGER REFERENCES taxonomy(id) ON DELETE SET NULL,
    tag_id INTEGER,
    value TEXT NOT NULL,
    name TEXT NOT NULL DEFAULT '',
    position INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL DEFAULT (unixepoch())
) STRICT;

CREATE INDEX IF NOT EXISTS idx_object_tag_object ON object_tag(object_id);
CREATE INDEX IF NOT EXISTS idx_object_tag_object_taxonomy
    ON object_tag(object_id, taxonomy_id);
CREATE INDEX IF NOT EXISTS idx_object_tag_taxonomy_value
    ON object_tag(taxonomy_id, value);
CREATE INDEX IF NOT EXISTS idx_object_tag_tag ON object_tag(tag_id);
"#;
