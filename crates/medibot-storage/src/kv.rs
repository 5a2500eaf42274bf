//! Key-value persistence.
//!
//! The chat client stores exactly one value (the serialized transcript)
//! under a fixed key, so the interface stays minimal: get, set, remove.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, OptionalExtension};
use tracing::debug;

use medibot_core::error::{MedibotError, Result};

use crate::db::Database;

/// String key-value store used for transcript persistence.
pub trait KeyValueStore: Send + Sync {
    /// Read the value for `key`, or `None` if it was never set or was removed.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite the value for `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

// =============================================================================
// SqliteStore
// =============================================================================

/// SQLite-backed store. Values survive process restarts.
#[derive(Debug)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open (or create) the database file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(Database::new(path)?))
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(Database::in_memory()?))
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| MedibotError::Storage(format!("Failed to read {}: {}", key, e)))
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                updated_at = excluded.updated_at",
                params![key, value, now],
            )
            .map_err(|e| MedibotError::Storage(format!("Failed to write {}: {}", key, e)))?;
            debug!(key, bytes = value.len(), "Stored value");
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.db.with_conn(|conn| {
            conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])
                .map_err(|e| MedibotError::Storage(format!("Failed to remove {}: {}", key, e)))?;
            Ok(())
        })
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_values(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|e| MedibotError::Storage(format!("store lock poisoned: {}", e)))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock_values()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock_values()?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock_values()?.remove(key);
        Ok(())
    }
}
