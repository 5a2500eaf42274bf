//! Database connection management.
//!
//! Wraps a single rusqlite Connection in a Mutex and configures WAL mode
//! on open.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::info;

use medibot_core::error::MedibotError;

use crate::migrations;

/// SQLite database wrapper.
///
/// `Connection` is `Send` but not `Sync`; the Mutex makes the wrapper
/// shareable.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a database at the given path and run migrations.
    pub fn new(path: &Path) -> Result<Self, MedibotError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| MedibotError::Storage(format!("Failed to open database: {}", e)))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| MedibotError::Storage(format!("Failed to set pragmas: {}", e)))?;

        info!("Database opened at {}", path.display());

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(migrations::run_migrations)?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, MedibotError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| MedibotError::Storage(format!("Failed to open in-memory db: {}", e)))?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(migrations::run_migrations)?;
        Ok(db)
    }

    /// Execute a closure with a reference to the underlying connection.
    ///
    /// The mutex is held for the duration of the closure.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, MedibotError>
    where
        F: FnOnce(&Connection) -> Result<T, MedibotError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| MedibotError::Storage(format!("Database lock poisoned: {}", e)))?;
        f(&conn)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kv_rows(db: &Database) -> i64 {
        db.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM kv_store", [], |row| row.get(0))
                .map_err(|e| MedibotError::Storage(e.to_string()))
        })
        .unwrap()
    }

    #[test]
    fn test_in_memory_database() {
        let db = Database::in_memory().unwrap();
        assert_eq!(kv_rows(&db), 0);
    }

    #[test]
    fn test_file_database_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("medibot.db");
        let db = Database::new(&path).unwrap();
        assert_eq!(kv_rows(&db), 0);
        assert!(path.exists());
    }

    #[test]
    fn test_wal_mode_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(&dir.path().join("wal.db")).unwrap();
        db.with_conn(|conn| {
            let mode: String = conn
                .query_row("PRAGMA journal_mode", [], |row| row.get(0))
                .map_err(|e| MedibotError::Storage(e.to_string()))?;
            assert_eq!(mode, "wal");
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_reopen_keeps_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("medibot.db");
        drop(Database::new(&path).unwrap());
        let db = Database::new(&path).unwrap();
        assert_eq!(kv_rows(&db), 0);
    }
}
