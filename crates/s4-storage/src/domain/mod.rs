//! # Domain Layer
//!
//! Pure domain logic for S4: entities and the shared write pipeline.

pub mod entities;
pub mod validation;

pub use entities::{
    address_hex, Address, Constraints, Entry, EntryState, Metadata, Record, SlotId, SnapshotRow,
    StorageStats, TimestampMillis,
};
pub use validation::{check_slot, resolve_conflict, validate_write, SlotHead};
