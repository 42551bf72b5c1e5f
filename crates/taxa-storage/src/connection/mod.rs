//! Connection management.

pub mod pragmas;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use taxa_core::errors::StorageError;

use crate::migrations;

/// Owns the database connection and serializes writers.
///
/// Cross-request coordination happens entirely through the transactional
/// store, so a single connection behind a mutex is enough: SQLite
/// serializes writers anyway, and WAL mode keeps readers unblocked.
pub struct DatabaseManager {
    conn: Mutex<Connection>,
}

impl DatabaseManager {
    /// Open (or create) a database file, apply pragmas, and run migrations.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|e| StorageError::SqliteError {
            message: format!("failed to open {}: {e}", path.display()),
        })?;
        Self::initialize(conn)
    }

    /// Open an in-memory database. Used by tests and ephemeral tooling.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|e| StorageError::SqliteError {
            message: format!("failed to open in-memory database: {e}"),
        })?;
        Self::initialize(conn)
    }

    fn initialize(conn: Connection) -> Result<Self, StorageError> {
        pragmas::apply_pragmas(&conn)?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run a closure with mutable access to the connection. The closure may
    /// open a transaction; writers are serialized by the mutex.
    pub fn with_writer<T, E>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StorageError>,
    {
        let mut guard = self.conn.lock().map_err(|_| StorageError::SqliteError {
            message: "connection mutex poisoned".to_string(),
        })?;
        f(&mut guard)
    }

    /// Run a closure with shared read access to the connection.
    pub fn with_reader<T, E>(&self, f: impl FnOnce(&Connection) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StorageError>,
    {
        let guard = self.conn.lock().map_err(|_| StorageError::SqliteError {
            message: "connection mutex poisoned".to_string(),
        })?;
        f(&guard)
    }
}
