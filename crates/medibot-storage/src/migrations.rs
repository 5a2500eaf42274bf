//! Database schema migrations.

use rusqlite::Connection;
use tracing::info;

use medibot_core::error::MedibotError;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), MedibotError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| MedibotError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| MedibotError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: kv_store");
    }

    Ok(())
}

/// Version 1: single key-value table.
fn apply_v1(conn: &Connection) -> Result<(), MedibotError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS kv_store (
            key         TEXT PRIMARY KEY NOT NULL,
            value       TEXT NOT NULL,
            updated_at  INTEGER NOT NULL
        );

        INSERT INTO schema_migrations (version, name) VALUES (1, 'kv_store');
        ",
    )
    .map_err(|e| MedibotError::Storage(format!("Migration v1 failed: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(conn: &Connection) -> i64 {
        conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })
        .unwrap()
    }

    #[test]
    fn test_migrations_apply_once() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(version(&conn), 1);

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }
}
