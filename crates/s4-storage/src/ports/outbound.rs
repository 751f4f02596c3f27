//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the S4 storage engine.

use crate::domain::entities::{Address, Entry, Record, SlotId, TimestampMillis};
use crate::error::{EnvelopeError, StoreError};
use async_trait::async_trait;

/// Signature binding capability.
///
/// Produces the canonical signable bytes for a write and recovers the address
/// that signed them. The engine treats any error as an authorization failure.
pub trait Envelope: Send + Sync {
    /// Canonical signable representation of `(address, slot_id, record)`.
    fn sign_target(
        &self,
        address: &Address,
        slot_id: SlotId,
        record: &Record,
    ) -> Result<Vec<u8>, EnvelopeError>;

    /// Recover the address that produced `signature` over `sign_target`.
    fn recover_signer(&self, sign_target: &[u8], signature: &[u8])
        -> Result<Address, EnvelopeError>;
}

/// Backing entry store used by the persistent adapter.
///
/// ## Contract
///
/// - `get` returns `StoreError::NotFound` when no entry exists.
/// - `upsert` must be atomic per key and must reject an entry whose version is
///   not strictly greater than the stored one with `StoreError::VersionConflict`.
///   This closes the gap between the adapter's read and its write.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Fetch the entry for `(address, slot_id)`.
    async fn get(&self, address: &Address, slot_id: SlotId) -> Result<Entry, StoreError>;

    /// Insert or replace the entry for `(address, slot_id)`.
    async fn upsert(&self, address: &Address, slot_id: SlotId, entry: &Entry)
        -> Result<(), StoreError>;
}

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Current unix time in milliseconds.
    fn now_millis(&self) -> TimestampMillis;
}

/// Default time source using system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_millis(&self) -> TimestampMillis {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as TimestampMillis)
            .unwrap_or(0)
    }
}
