//! # Canonical Envelope
//!
//! The exact bytes a writer signs for `(address, slot_id, record)`.
//!
//! Compact JSON, fields in this order, binary values as `0x`-prefixed
//! lower-case hex:
//!
//! ```text
//! {"address":"0x..","slotid":0,"payload":"0x..","version":1,"expiration":1700000000000}
//! ```

use s4_storage::{address_hex, Address, EnvelopeError, Record, SlotId};
use serde::Serialize;
use sha3::{Digest, Keccak256};

/// 32-byte keccak256 digest.
pub type Hash = [u8; 32];

const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

#[derive(Debug, Serialize)]
struct CanonicalEnvelope {
    address: String,
    slotid: SlotId,
    payload: String,
    version: u64,
    expiration: i64,
}

/// Canonical JSON bytes for a write.
pub fn canonical_json(
    address: &Address,
    slot_id: SlotId,
    record: &Record,
) -> Result<Vec<u8>, EnvelopeError> {
    let envelope = CanonicalEnvelope {
        address: address_hex(address),
        slotid: slot_id,
        payload: format!("0x{}", hex::encode(&record.payload)),
        version: record.version,
        expiration: record.expiration,
    };

    serde_json::to_vec(&envelope).map_err(|e| EnvelopeError::Canonicalization(e.to_string()))
}

/// Keccak256 hash function.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Digest actually signed: the personal-message hash of `keccak256(message)`.
pub fn personal_message_hash(message: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(PERSONAL_MESSAGE_PREFIX);
    hasher.update(keccak256(message));
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}
