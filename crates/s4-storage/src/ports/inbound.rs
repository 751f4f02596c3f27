//! # Inbound Ports (Driving Ports)
//!
//! The public API of the S4 storage engine.

use crate::domain::entities::{Address, Constraints, Metadata, Record, SlotId};
use crate::error::S4Result;
use async_trait::async_trait;

/// S4 storage access interface.
///
/// Implemented by both the in-memory backend and the persistent adapter.
/// All methods are thread-safe. Every operation is `async`; a caller cancels
/// by dropping the future (for example via `tokio::time::timeout`).
#[async_trait]
pub trait S4Storage: Send + Sync {
    /// Return the constraints fixed at construction.
    fn constraints(&self) -> Constraints;

    /// Return a copy of the record and metadata stored at `(address, slot_id)`.
    ///
    /// ## Errors
    ///
    /// - `SlotOutOfRange`: `slot_id >= max_slots_per_user`
    /// - `ServiceNotStarted`: in-memory backend not running
    /// - `RecordNotFound`: no entry for the key
    /// - `RecordExpired`: entry exists but has expired
    async fn get(&self, address: &Address, slot_id: SlotId) -> S4Result<(Record, Metadata)>;

    /// Create or update the record at `(address, slot_id)`.
    ///
    /// The signature must be produced by `address` over the envelope of
    /// `(address, slot_id, record)`.
    ///
    /// ## Errors
    ///
    /// - `SlotOutOfRange`, `PayloadTooLarge`, `PastExpiration`: request validation
    /// - `WrongSignature`: signer does not match `address`
    /// - `StaleVersion`: `record.version` not above the stored version
    async fn put(
        &self,
        address: &Address,
        slot_id: SlotId,
        record: &Record,
        signature: &[u8],
    ) -> S4Result<()>;
}
