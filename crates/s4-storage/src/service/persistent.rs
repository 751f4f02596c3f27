//! # Persistent S4 Storage
//!
//! Adapter exposing the [`S4Storage`] contract over an [`EntryStore`].
//!
//! There is no lifecycle and no sweep: expiry is evaluated on read, and the
//! store's conditional upsert arbitrates concurrent writers to the same key.
//! Dropping a returned future drops the in-flight store call with it.

use crate::config::S4Config;
use crate::domain::entities::{address_hex, Address, Constraints, Metadata, Record, SlotId};
use crate::domain::validation::{check_slot, resolve_conflict, validate_write, SlotHead};
use crate::error::{ConfigError, S4Error, S4Result, StoreError};
use crate::ports::inbound::S4Storage;
use crate::ports::outbound::{EntryStore, Envelope, SystemTimeSource, TimeSource};
use async_trait::async_trait;
use tracing::debug;

/// [`S4Storage`] backed by an [`EntryStore`].
pub struct PersistentS4Storage<S, E, T = SystemTimeSource> {
    store: S,
    envelope: E,
    time_source: T,
    constraints: Constraints,
}

impl<S, E> PersistentS4Storage<S, E, SystemTimeSource>
where
    S: EntryStore,
    E: Envelope,
{
    /// Create an adapter driven by the system clock.
    pub fn new(config: &S4Config, store: S, envelope: E) -> Result<Self, ConfigError> {
        Self::with_time_source(config, store, envelope, SystemTimeSource)
    }
}

impl<S, E, T> PersistentS4Storage<S, E, T>
where
    S: EntryStore,
    E: Envelope,
    T: TimeSource,
{
    /// Create an adapter with an explicit time source.
    pub fn with_time_source(
        config: &S4Config,
        store: S,
        envelope: E,
        time_source: T,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            store,
            envelope,
            time_source,
            constraints: config.constraints()?,
        })
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[async_trait]
impl<S, E, T> S4Storage for PersistentS4Storage<S, E, T>
where
    S: EntryStore,
    E: Envelope,
    T: TimeSource,
{
    fn constraints(&self) -> Constraints {
        self.constraints
    }

    async fn get(&self, address: &Address, slot_id: SlotId) -> S4Result<(Record, Metadata)> {
        check_slot(&self.constraints, slot_id)?;

        let entry = self.store.get(address, slot_id).await?;
        if entry.is_expired_at(self.time_source.now_millis()) {
            return Err(S4Error::RecordExpired);
        }

        Ok(entry.into_parts())
    }

    async fn put(
        &self,
        address: &Address,
        slot_id: SlotId,
        record: &Record,
        signature: &[u8],
    ) -> S4Result<()> {
        validate_write(
            &self.constraints,
            &self.envelope,
            self.time_source.now_millis(),
            address,
            slot_id,
            record,
            signature,
        )?;

        let existing = match self.store.get(address, slot_id).await {
            Ok(entry) => Some(SlotHead::from(&entry)),
            Err(StoreError::NotFound) => None,
            Err(e) => return Err(e.into()),
        };

        let entry = resolve_conflict(existing, record, signature)?;
        self.store.upsert(address, slot_id, &entry).await?;

        debug!(
            address = %address_hex(address),
            slot_id,
            version = entry.version,
            highest_expiration = entry.highest_expiration,
            "[s4] Record persisted"
        );
        Ok(())
    }
}
