//! In-memory [`EntryStore`] for tests and single-process deployments.

use crate::domain::entities::{Address, Entry, SlotId};
use crate::error::StoreError;
use crate::ports::outbound::EntryStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// HashMap-backed entry store with conditional upsert.
#[derive(Debug, Default)]
pub struct InMemoryEntryStore {
    entries: RwLock<HashMap<(Address, SlotId), Entry>>,
}

impl InMemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl EntryStore for InMemoryEntryStore {
    async fn get(&self, address: &Address, slot_id: SlotId) -> Result<Entry, StoreError> {
        self.entries
            .read()
            .get(&(*address, slot_id))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn upsert(
        &self,
        address: &Address,
        slot_id: SlotId,
        entry: &Entry,
    ) -> Result<(), StoreError> {
        let mut entries = self.entries.write();
        let key = (*address, slot_id);

        if let Some(stored) = entries.get(&key) {
            if entry.version <= stored.version {
                return Err(StoreError::VersionConflict {
                    stored: stored.version,
                    attempted: entry.version,
                });
            }
        }

        entries.insert(key, entry.clone());
        Ok(())
    }
}
