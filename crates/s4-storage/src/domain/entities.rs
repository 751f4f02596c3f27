//! # Domain Entities
//!
//! Core data structures of the S4 storage engine.
//!
//! ## Ownership
//!
//! The engine exclusively owns every [`Entry`]. Callers only ever receive
//! [`Record`] and [`Metadata`] values by copy, so mutating a returned value
//! can never reach engine-held state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ethereum-style address of a slot owner (20 bytes).
pub type Address = [u8; 20];

/// Index of a storage slot owned by a single address.
pub type SlotId = u32;

/// Unix time in milliseconds.
pub type TimestampMillis = i64;

/// Short hex rendering of an address for log fields.
pub fn address_hex(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}

/// A user-supplied record.
///
/// Immutable once accepted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Arbitrary user data, bounded by `Constraints::max_payload_size_bytes`.
    pub payload: Vec<u8>,
    /// Writer-chosen version (a unix timestamp is recommended).
    pub version: u64,
    /// Absolute expiration instant in unix milliseconds.
    pub expiration: TimestampMillis,
}

impl Record {
    /// Create a new record.
    pub fn new(payload: impl Into<Vec<u8>>, version: u64, expiration: TimestampMillis) -> Self {
        Self {
            payload: payload.into(),
            version,
            expiration,
        }
    }

    /// Whether this record is expired at `now`.
    #[inline]
    pub fn is_expired_at(&self, now: TimestampMillis) -> bool {
        self.expiration <= now
    }
}

/// Lifecycle state of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryState {
    /// Written locally, not yet confirmed by replication.
    New,
    /// Confirmed by replication.
    Confirmed,
    /// Expiration passed; marked by the sweep.
    Expired,
}

impl fmt::Display for EntryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryState::New => write!(f, "new"),
            EntryState::Confirmed => write!(f, "confirmed"),
            EntryState::Expired => write!(f, "expired"),
        }
    }
}

/// Engine-maintained metadata associated with a [`Record`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Current lifecycle state.
    pub state: EntryState,
    /// Highest expiration ever accepted for this slot. Never lowered.
    pub highest_expiration: TimestampMillis,
    /// Last accepted signature.
    pub signature: Vec<u8>,
}

impl Metadata {
    /// Whether the entry has been confirmed by replication.
    #[inline]
    pub fn is_confirmed(&self) -> bool {
        self.state == EntryState::Confirmed
    }
}

/// Storage-layer union of [`Record`] and [`Metadata`], keyed by `(address, slot_id)`.
///
/// ## Invariants
///
/// - `highest_expiration >= expiration`
/// - `version` is strictly greater than every previously accepted version for the key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub payload: Vec<u8>,
    pub version: u64,
    pub expiration: TimestampMillis,
    pub state: EntryState,
    pub highest_expiration: TimestampMillis,
    pub signature: Vec<u8>,
}

impl Entry {
    /// Join a record with its metadata.
    pub fn from_parts(record: Record, metadata: Metadata) -> Self {
        Self {
            payload: record.payload,
            version: record.version,
            expiration: record.expiration,
            state: metadata.state,
            highest_expiration: metadata.highest_expiration,
            signature: metadata.signature,
        }
    }

    /// Split into owned record and metadata copies.
    pub fn into_parts(self) -> (Record, Metadata) {
        (
            Record {
                payload: self.payload,
                version: self.version,
                expiration: self.expiration,
            },
            Metadata {
                state: self.state,
                highest_expiration: self.highest_expiration,
                signature: self.signature,
            },
        )
    }

    /// Whether the entry must be reported as expired at `now`.
    ///
    /// Covers both the swept state and lazy on-read expiry.
    #[inline]
    pub fn is_expired_at(&self, now: TimestampMillis) -> bool {
        self.state == EntryState::Expired || self.expiration <= now
    }
}

/// Engine-wide storage policy, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraints {
    /// Maximum payload size in bytes.
    pub max_payload_size_bytes: usize,
    /// Number of slots each address may use (`0..max_slots_per_user`).
    pub max_slots_per_user: u32,
}

impl Constraints {
    /// Whether `slot_id` is within the per-address quota.
    #[inline]
    pub fn slot_in_range(&self, slot_id: SlotId) -> bool {
        slot_id < self.max_slots_per_user
    }
}

/// One row of an engine snapshot (payload omitted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub address: Address,
    pub slot_id: SlotId,
    pub version: u64,
    pub expiration: TimestampMillis,
    pub state: EntryState,
    pub payload_size: usize,
}

/// Entry counts by state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageStats {
    pub new: usize,
    pub confirmed: usize,
    pub expired: usize,
}

impl StorageStats {
    /// Total number of entries.
    pub fn total(&self) -> usize {
        self.new + self.confirmed + self.expired
    }
}
