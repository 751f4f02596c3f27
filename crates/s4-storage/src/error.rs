//! Error types for the S4 storage engine.
//!
//! Every validation failure maps to exactly one [`S4Error`] variant and is
//! returned before any engine state is touched.

use crate::domain::entities::SlotId;
use thiserror::Error;

/// Errors returned by `S4Storage` implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum S4Error {
    /// Slot index outside `0..max_slots_per_user`.
    #[error("Slot id {slot_id} out of range (max {max_slots})")]
    SlotOutOfRange { slot_id: SlotId, max_slots: u32 },

    /// Payload larger than `max_payload_size_bytes`.
    #[error("Payload too large: {size} bytes, max {max_size} bytes")]
    PayloadTooLarge { size: usize, max_size: usize },

    /// Record expiration is not in the future.
    #[error("Expiration {expiration} is in the past (now {now})")]
    PastExpiration { expiration: i64, now: i64 },

    /// Signature does not recover to the claimed address.
    #[error("Wrong signature")]
    WrongSignature,

    /// Version is not strictly greater than the stored version.
    #[error("Version too low: got {version}, stored {stored}")]
    StaleVersion { version: u64, stored: u64 },

    /// No entry exists for the key.
    #[error("Record not found")]
    RecordNotFound,

    /// The entry exists but has expired.
    #[error("Record expired")]
    RecordExpired,

    /// In-memory backend used outside its running window.
    #[error("Service not started")]
    ServiceNotStarted,

    /// Lifecycle transition not allowed from the current state.
    #[error("Invalid lifecycle transition from {from} to {to}")]
    InvalidLifecycleTransition {
        from: &'static str,
        to: &'static str,
    },

    /// Opaque failure from the backing entry store.
    #[error("Backing store error: {0}")]
    Store(String),
}

/// Result type for storage operations.
pub type S4Result<T> = Result<T, S4Error>;

/// Errors reported by an `EntryStore`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No entry for the requested key.
    #[error("Entry not found")]
    NotFound,

    /// Conditional upsert rejected: stored version is not lower than the new one.
    #[error("Version conflict: stored {stored}, attempted {attempted}")]
    VersionConflict { stored: u64, attempted: u64 },

    /// Any other storage failure.
    #[error("Store I/O error: {message}")]
    Io { message: String },
}

impl From<StoreError> for S4Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => S4Error::RecordNotFound,
            StoreError::VersionConflict { stored, attempted } => S4Error::StaleVersion {
                version: attempted,
                stored,
            },
            StoreError::Io { message } => S4Error::Store(message),
        }
    }
}

/// Errors reported by an `Envelope` implementation.
///
/// The engine collapses all of these into [`S4Error::WrongSignature`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    /// Signature bytes are malformed.
    #[error("Invalid signature format: {0}")]
    InvalidFormat(String),

    /// Public key recovery failed.
    #[error("Signer recovery failed")]
    RecoveryFailed,

    /// The sign target could not be produced.
    #[error("Canonicalization failed: {0}")]
    Canonicalization(String),

    /// Producing a signature failed (writer side).
    #[error("Signing failed: {0}")]
    Signing(String),
}

/// Configuration errors, raised at construction time.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `max_slots_per_user` must be at least 1.
    #[error("max_slots_per_user must be greater than zero")]
    ZeroSlots,

    /// `sweep_interval_ms` must be at least 1.
    #[error("sweep_interval_ms must be greater than zero")]
    ZeroSweepInterval,

    /// Config file could not be read.
    #[error("Failed to read {path}: {error}")]
    Io { path: String, error: String },

    /// Config file could not be parsed.
    #[error("Failed to parse config: {0}")]
    Parse(String),
}
