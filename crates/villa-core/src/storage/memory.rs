//! In-memory slot store for tests and throwaway sessions.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::{StorageError, StorageResult};
use super::{LegacyRecord, LegacyStore, SlotStore};
use crate::models::Slot;

/// In-memory store implementing both slot and legacy access.
#[derive(Debug, Default)]
pub struct MemorySlotStore {
    slots: RwLock<HashMap<Slot, String>>,
    records: RwLock<HashMap<LegacyRecord, String>>,
    blobs: RwLock<BTreeMap<String, String>>,
    absorbed: RwLock<bool>,
    capacity: Option<usize>,
}

impl MemorySlotStore {
    /// Create a new empty store with no size limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes larger than `capacity` bytes.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Seed a legacy record.
    pub async fn insert_legacy_record(&self, record: LegacyRecord, payload: impl Into<String>) {
        self.records.write().await.insert(record, payload.into());
    }

    /// Seed a legacy blob.
    pub async fn insert_legacy_blob(&self, key: impl Into<String>, payload: impl Into<String>) {
        self.blobs.write().await.insert(key.into(), payload.into());
    }

    /// Keys of the legacy blobs still present.
    pub async fn blob_keys(&self) -> Vec<String> {
        self.blobs.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl SlotStore for MemorySlotStore {
    async fn get(&self, slot: Slot) -> StorageResult<Option<String>> {
        Ok(self.slots.read().await.get(&slot).cloned())
    }

    async fn put(&self, slot: Slot, payload: &str) -> StorageResult<()> {
        if let Some(limit) = self.capacity {
            if payload.len() > limit {
                return Err(StorageError::CapacityExceeded {
                    slot,
                    size: payload.len(),
                    limit,
                });
            }
        }
        self.slots.write().await.insert(slot, payload.to_string());
        Ok(())
    }

    async fn clear(&self, slot: Slot) -> StorageResult<()> {
        self.slots.write().await.remove(&slot);
        Ok(())
    }
}

#[async_trait]
impl LegacyStore for MemorySlotStore {
    async fn is_absorbed(&self) -> StorageResult<bool> {
        Ok(*self.absorbed.read().await)
    }

    async fn mark_absorbed(&self) -> StorageResult<()> {
        *self.absorbed.write().await = true;
        Ok(())
    }

    async fn read_record(&self, record: LegacyRecord) -> StorageResult<Option<String>> {
        Ok(self.records.read().await.get(&record).cloned())
    }

    async fn remove_record(&self, record: LegacyRecord) -> StorageResult<()> {
        self.records.write().await.remove(&record);
        Ok(())
    }

    async fn get_blob(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.blobs.read().await.get(key).cloned())
    }

    async fn delete_blob(&self, key: &str) -> StorageResult<()> {
        self.blobs.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_slots_are_independent() {
        let store = MemorySlotStore::new();
        store.put(Slot::Live, "L").await.unwrap();
        store.put(Slot::Draft, "D").await.unwrap();

        store.clear(Slot::Draft).await.unwrap();
        assert_eq!(store.get(Slot::Live).await.unwrap().as_deref(), Some("L"));
        assert!(store.get(Slot::Draft).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_capacity() {
        let store = MemorySlotStore::new().with_capacity(3);
        let err = store.put(Slot::Draft, "abcd").await.unwrap_err();
        assert!(err.is_capacity());
        assert!(store.get(Slot::Draft).await.unwrap().is_none());
    }
}
