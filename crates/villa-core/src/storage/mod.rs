//! Storage layer
//!
//! Durable two-slot content store plus access to the retired storage layout.
//!
//! ## Architecture
//!
//! - **Slots**: two fixed keys, `live` and `draft`, each holding at most one
//!   serialized document. Every write replaces the whole value.
//! - **Legacy records**: documents written by older versions of the editor,
//!   together with the secondary blob table their image references point into.
//!   These are read once, absorbed into the slots, and deleted.
//!
//! Backends: SQLite for real use, in-memory for tests and throwaway sessions.

pub mod error;
pub mod memory;
pub mod persistence;
pub mod schema;
pub mod sqlite;

use async_trait::async_trait;

use crate::models::Slot;

pub use error::{StorageError, StorageResult};
pub use memory::MemorySlotStore;
pub use persistence::atomic_write;
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
pub use sqlite::SqliteSlotStore;

/// Default slot capacity: 5 MiB of serialized JSON
pub const DEFAULT_CAPACITY: usize = 5 * 1024 * 1024;

/// Key-addressed store with two independent document slots
///
/// Writes are atomic per slot. Nothing is transactional across slots.
#[async_trait]
pub trait SlotStore: Send + Sync {
    /// Read the serialized document in a slot
    async fn get(&self, slot: Slot) -> StorageResult<Option<String>>;

    /// Replace the contents of a slot
    ///
    /// Fails with [`StorageError::CapacityExceeded`] when the payload is over
    /// the store's limit.
    async fn put(&self, slot: Slot, payload: &str) -> StorageResult<()>;

    /// Empty a slot. Clearing an empty slot is not an error.
    async fn clear(&self, slot: Slot) -> StorageResult<()>;
}

/// Documents written by the retired single-record storage layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegacyRecord {
    /// The copy the old editor treated as published
    Published,
    /// The old editor's working copy
    Working,
}

impl LegacyRecord {
    /// Both records, in absorption order: published first so the working copy
    /// can fall back to its photos
    pub const ALL: [LegacyRecord; 2] = [LegacyRecord::Published, LegacyRecord::Working];

    /// Key the record was stored under
    pub fn key(&self) -> &'static str {
        match self {
            LegacyRecord::Published => "villa-content-live",
            LegacyRecord::Working => "villa-content",
        }
    }

    /// Slot the record is absorbed into
    pub fn target(&self) -> Slot {
        match self {
            LegacyRecord::Published => Slot::Live,
            LegacyRecord::Working => Slot::Draft,
        }
    }
}

/// Read access to the retired storage layout, plus the one-time marker
#[async_trait]
pub trait LegacyStore: Send + Sync {
    /// Whether legacy data has already been absorbed
    async fn is_absorbed(&self) -> StorageResult<bool>;

    /// Record that absorption finished
    async fn mark_absorbed(&self) -> StorageResult<()>;

    async fn read_record(&self, record: LegacyRecord) -> StorageResult<Option<String>>;

    async fn remove_record(&self, record: LegacyRecord) -> StorageResult<()>;

    /// Look up a payload by indirection key
    async fn get_blob(&self, key: &str) -> StorageResult<Option<String>>;

    async fn delete_blob(&self, key: &str) -> StorageResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_record_targets() {
        assert_eq!(LegacyRecord::Published.target(), Slot::Live);
        assert_eq!(LegacyRecord::Working.target(), Slot::Draft);
        assert_eq!(LegacyRecord::ALL[0], LegacyRecord::Published);
    }
}
