//! Connection and migration tests.

use taxa_storage::connection::pragmas;
use taxa_storage::{migrations, DatabaseManager};
use tempfile::TempDir;

#[test]
fn pragmas_set_correctly() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("taxa.db");
    let db = DatabaseManager::open(&db_path).unwrap();

    db.with_reader::<_, taxa_core::errors::StorageError>(|conn| {
        let mode: String = conn
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal", "journal_mode should be WAL");

        let fk: i64 = conn
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1, "foreign_keys should be ON");

        let timeout: i64 = conn
            .pragma_query_value(None, "busy_timeout", |row| row.get(0))
            .unwrap();
        assert_eq!(timeout, 5000, "busy_timeout should be 5000ms");

        assert!(pragmas::verify_wal_mode(conn).unwrap());
        Ok(())
    })
    .unwrap();
}

#[test]
fn migrations_apply_once_and_are_idempotent() {
    let db = DatabaseManager::open_in_memory().unwrap();

    db.with_writer::<_, taxa_core::errors::StorageError>(|conn| {
        assert_eq!(migrations::current_version(conn).unwrap(), 2);

        // Re-running is a no-op.
        migrations::run_migrations(conn).unwrap();
        assert_eq!(migrations::current_version(conn).unwrap(), 2);

        // All domain tables exist.
        for table in ["taxonomy", "tag", "object_tag", "tag_import_task"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {table}");
        }
        Ok(())
    })
    .unwrap();
}

#[test]
fn reopening_preserves_schema_version() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("taxa.db");

    {
        let _db = DatabaseManager::open(&db_path).unwrap();
    }
    let db = DatabaseManager::open(&db_path).unwrap();
    db.with_reader::<_, taxa_core::errors::StorageError>(|conn| {
        assert_eq!(migrations::current_version(conn).unwrap(), 2);
        Ok(())
    })
    .unwrap();
}
