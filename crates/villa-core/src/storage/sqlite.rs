//! SQLite-backed slot store
//!
//! Each slot is a single row; `put` is one upsert statement, so a write either
//! lands completely or not at all. The same database holds the tables of the
//! retired storage layout, which is why this type also implements
//! [`LegacyStore`].

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;
use tracing::debug;

use super::error::{StorageError, StorageResult};
use super::schema::{init_schema, needs_init, LEGACY_MARKER_KEY};
use super::{LegacyRecord, LegacyStore, SlotStore, DEFAULT_CAPACITY};
use crate::config::Config;
use crate::models::Slot;

/// Slot store persisted in a SQLite database file
///
/// Statements run inline on the calling task while the connection lock is
/// held. Each one is a single-row read or upsert, so this stays short; a
/// caller serving many concurrent sessions should wrap it in
/// `tokio::task::spawn_blocking` instead.
pub struct SqliteSlotStore {
    conn: Mutex<Connection>,
    capacity: usize,
}

impl SqliteSlotStore {
    /// Open or create the database described by the configuration
    pub fn open(config: &Config) -> StorageResult<Self> {
        let store = Self::open_path(&config.content_db_path())?;
        Ok(store.with_capacity(config.max_document_bytes))
    }

    /// Open or create a database at a specific path
    pub fn open_path(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        if needs_init(&conn) {
            init_schema(&conn)?;
        }
        Ok(Self {
            conn: Mutex::new(conn),
            capacity: DEFAULT_CAPACITY,
        })
    }

    /// Set the maximum size of a stored document, in bytes
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Size in bytes of the payload currently in a slot
    pub async fn slot_size(&self, slot: Slot) -> StorageResult<Option<usize>> {
        let conn = self.conn.lock().await;
        let size: Option<i64> = conn
            .query_row(
                "SELECT length(CAST(payload AS BLOB)) FROM slots WHERE name = ?1",
                [slot.key()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(size.map(|s| s as usize))
    }

    /// Write a legacy record (used when importing an old database, and in tests)
    pub async fn insert_legacy_record(&self, record: LegacyRecord, payload: &str) -> StorageResult<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO legacy_records (key, payload) VALUES (?1, ?2)",
            params![record.key(), payload],
        )?;
        Ok(())
    }

    /// Write a legacy blob
    pub async fn insert_legacy_blob(&self, key: &str, payload: &str) -> StorageResult<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO legacy_blobs (key, payload) VALUES (?1, ?2)",
            params![key, payload],
        )?;
        Ok(())
    }
}

#[async_trait]
impl SlotStore for SqliteSlotStore {
    async fn get(&self, slot: Slot) -> StorageResult<Option<String>> {
        let conn = self.conn.lock().await;
        let payload = conn
            .query_row(
                "SELECT payload FROM slots WHERE name = ?1",
                [slot.key()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(payload)
    }

    async fn put(&self, slot: Slot, payload: &str) -> StorageResult<()> {
        if payload.len() > self.capacity {
            return Err(StorageError::CapacityExceeded {
                slot,
                size: payload.len(),
                limit: self.capacity,
            });
        }

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO slots (name, payload, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at",
            params![slot.key(), payload, Utc::now().timestamp_millis()],
        )
        .map_err(|e| StorageError::from_write(e, slot))?;

        debug!(slot = %slot, bytes = payload.len(), "slot written");
        Ok(())
    }

    async fn clear(&self, slot: Slot) -> StorageResult<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM slots WHERE name = ?1", [slot.key()])?;
        debug!(slot = %slot, "slot cleared");
        Ok(())
    }
}

#[async_trait]
impl LegacyStore for SqliteSlotStore {
    async fn is_absorbed(&self) -> StorageResult<bool> {
        let conn = self.conn.lock().await;
        let marker: Option<String> = conn
            .query_row(
                "SELECT value FROM schema_info WHERE key = ?1",
                [LEGACY_MARKER_KEY],
                |row| row.get(0),
            )
            .optional()?;
        Ok(marker.is_some())
    }

    async fn mark_absorbed(&self) -> StorageResult<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO schema_info (key, value) VALUES (?1, ?2)",
            params![LEGACY_MARKER_KEY, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    async fn read_record(&self, record: LegacyRecord) -> StorageResult<Option<String>> {
        let conn = self.conn.lock().await;
        let payload = conn
            .query_row(
                "SELECT payload FROM legacy_records WHERE key = ?1",
                [record.key()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(payload)
    }

    async fn remove_record(&self, record: LegacyRecord) -> StorageResult<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM legacy_records WHERE key = ?1", [record.key()])?;
        Ok(())
    }

    async fn get_blob(&self, key: &str) -> StorageResult<Option<String>> {
        let conn = self.conn.lock().await;
        let payload = conn
            .query_row(
                "SELECT payload FROM legacy_blobs WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(payload)
    }

    async fn delete_blob(&self, key: &str) -> StorageResult<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM legacy_blobs WHERE key = ?1", [key])?;
        Ok(())
    }
}
