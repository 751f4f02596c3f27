//! # S4 Storage Engine
//!
//! Node-local key-value store holding small, user-signed, versioned records
//! with a bounded lifetime. Each record lives at `(address, slot_id)`; only the
//! owner of `address` may write it, every write must carry a strictly higher
//! version, and entries expire at their `expiration` instant.
//!
//! ## Write Pipeline
//!
//! ```text
//! put(address, slot, record, sig)
//!     │
//!     ├─ slot range ─ payload size ─ expiration > now   (cheap checks)
//!     ├─ recover_signer(sign_target(..), sig) == address (Envelope)
//!     ├─ version > stored.version                        (conflict)
//!     └─ commit: state = New, highest_expiration = max(..)
//! ```
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Owner-only writes | Signer recovered from the envelope must equal `address` |
//! | 2 | Version monotonicity | Accepted versions strictly increase per key |
//! | 3 | Expiration high-water mark | `highest_expiration` never decreases |
//! | 4 | Bounded slots | `slot_id < max_slots_per_user` |
//! | 5 | Bounded payload | `payload.len() <= max_payload_size_bytes` |
//! | 6 | No live view after expiry | `get` on an expired entry fails `RecordExpired` |
//! | 7 | All or nothing | A rejected write leaves the entry untouched |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Entities and the shared validation/conflict pipeline
//! - `ports/` - `S4Storage` (inbound); `Envelope`, `EntryStore`, `TimeSource` (outbound)
//! - `adapters/` - In-memory `EntryStore`
//! - `service/` - In-memory backend and persistent adapter
//!
//! ## Usage
//!
//! ```ignore
//! use s4_storage::{InMemoryS4Storage, S4Config, S4Storage};
//!
//! let storage = InMemoryS4Storage::new(&S4Config::default(), envelope)?;
//! storage.start().await?;
//!
//! storage.put(&address, 0, &record, &signature).await?;
//! let (record, metadata) = storage.get(&address, 0).await?;
//!
//! storage.close().await?;
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export key types for convenience
pub use adapters::InMemoryEntryStore;
pub use config::S4Config;
pub use domain::entities::{
    address_hex, Address, Constraints, Entry, EntryState, Metadata, Record, SlotId, SnapshotRow,
    StorageStats, TimestampMillis,
};
pub use error::{ConfigError, EnvelopeError, S4Error, S4Result, StoreError};
pub use ports::inbound::S4Storage;
pub use ports::outbound::{EntryStore, Envelope, SystemTimeSource, TimeSource};
pub use service::{InMemoryS4Storage, LifecycleState, PersistentS4Storage};
