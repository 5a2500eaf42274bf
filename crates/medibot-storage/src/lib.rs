//! Medibot storage crate - persistence for the chat transcript.
//!
//! Exposes a small key-value abstraction with a WAL-mode SQLite backend
//! for the binary and an in-memory backend for tests.

pub mod db;
pub mod kv;
pub mod migrations;

pub use db::Database;
pub use kv::{KeyValueStore, MemoryStore, SqliteStore};
