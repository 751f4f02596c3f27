//! # Write Validation & Conflict Resolution
//!
//! The write pipeline shared by every backend. Steps run in a fixed order and
//! each one short-circuits without touching engine state:
//!
//! | Step | Check | Error |
//! |------|-------|-------|
//! | 1 | `slot_id < max_slots_per_user` | `SlotOutOfRange` |
//! | 2 | `payload.len() <= max_payload_size_bytes` | `PayloadTooLarge` |
//! | 3 | `expiration > now` | `PastExpiration` |
//! | 4 | recovered signer == address | `WrongSignature` |
//! | 5 | `version > stored.version` | `StaleVersion` |
//!
//! Steps 1-4 are [`validate_write`]; step 5 is [`resolve_conflict`], which the
//! backend runs against whatever entry it currently holds for the key.

use super::entities::{
    address_hex, Address, Constraints, Entry, EntryState, Record, SlotId, TimestampMillis,
};
use crate::error::{S4Error, S4Result};
use crate::ports::outbound::Envelope;
use tracing::warn;

/// Step 1: slot range check. Also used by reads.
#[inline]
pub fn check_slot(constraints: &Constraints, slot_id: SlotId) -> S4Result<()> {
    if !constraints.slot_in_range(slot_id) {
        return Err(S4Error::SlotOutOfRange {
            slot_id,
            max_slots: constraints.max_slots_per_user,
        });
    }
    Ok(())
}

/// Steps 1-4: everything that does not depend on stored state.
///
/// Cheap checks run before signer recovery so malformed requests never cost a
/// signature recovery.
pub fn validate_write<E>(
    constraints: &Constraints,
    envelope: &E,
    now: TimestampMillis,
    address: &Address,
    slot_id: SlotId,
    record: &Record,
    signature: &[u8],
) -> S4Result<()>
where
    E: Envelope + ?Sized,
{
    check_slot(constraints, slot_id)?;

    if record.payload.len() > constraints.max_payload_size_bytes {
        return Err(S4Error::PayloadTooLarge {
            size: record.payload.len(),
            max_size: constraints.max_payload_size_bytes,
        });
    }

    if record.expiration <= now {
        return Err(S4Error::PastExpiration {
            expiration: record.expiration,
            now,
        });
    }

    verify_signer(envelope, address, slot_id, record, signature)
}

/// Step 4: bind the write to the claimed owner.
fn verify_signer<E>(
    envelope: &E,
    address: &Address,
    slot_id: SlotId,
    record: &Record,
    signature: &[u8],
) -> S4Result<()>
where
    E: Envelope + ?Sized,
{
    let recovered = envelope
        .sign_target(address, slot_id, record)
        .and_then(|target| envelope.recover_signer(&target, signature));

    match recovered {
        Ok(signer) if signer == *address => Ok(()),
        Ok(signer) => {
            warn!(
                address = %address_hex(address),
                signer = %address_hex(&signer),
                slot_id,
                "[s4] Rejecting write: signer mismatch"
            );
            Err(S4Error::WrongSignature)
        }
        Err(e) => {
            warn!(
                address = %address_hex(address),
                slot_id,
                error = %e,
                "[s4] Rejecting write: signer recovery failed"
            );
            Err(S4Error::WrongSignature)
        }
    }
}

/// The parts of a stored entry that conflict resolution needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotHead {
    pub version: u64,
    pub highest_expiration: TimestampMillis,
}

impl From<&Entry> for SlotHead {
    fn from(entry: &Entry) -> Self {
        Self {
            version: entry.version,
            highest_expiration: entry.highest_expiration,
        }
    }
}

/// Step 5: resolve against the stored entry and build the entry to commit.
///
/// The returned entry always has state `New` and carries `signature`.
/// `highest_expiration` is the max of the stored high-water mark and the new
/// expiration, so a shorter-lived overwrite never shrinks the slot's window.
pub fn resolve_conflict(
    existing: Option<SlotHead>,
    record: &Record,
    signature: &[u8],
) -> S4Result<Entry> {
    let highest_expiration = match existing {
        None => record.expiration,
        Some(stored) => {
            if record.version <= stored.version {
                return Err(S4Error::StaleVersion {
                    version: record.version,
                    stored: stored.version,
                });
            }
            stored.highest_expiration.max(record.expiration)
        }
    };

    Ok(Entry {
        payload: record.payload.clone(),
        version: record.version,
        expiration: record.expiration,
        state: EntryState::New,
        highest_expiration,
        signature: signature.to_vec(),
    })
}
