//! # secp256k1 Envelope
//!
//! [`Envelope`] implementation used by S4 in production, plus the writer-side
//! [`sign_envelope`] helper.

use crate::domain::{canonical_json, personal_message_hash, recover_address, sign_prehash};
use k256::ecdsa::SigningKey;
use s4_storage::{address_hex, Address, Envelope, EnvelopeError, Record, SlotId};
use tracing::trace;

/// Ethereum-compatible signature envelope.
#[derive(Debug, Default, Clone, Copy)]
pub struct Secp256k1Envelope;

impl Secp256k1Envelope {
    pub fn new() -> Self {
        Self
    }
}

impl Envelope for Secp256k1Envelope {
    fn sign_target(
        &self,
        address: &Address,
        slot_id: SlotId,
        record: &Record,
    ) -> Result<Vec<u8>, EnvelopeError> {
        canonical_json(address, slot_id, record)
    }

    fn recover_signer(
        &self,
        sign_target: &[u8],
        signature: &[u8],
    ) -> Result<Address, EnvelopeError> {
        let digest = personal_message_hash(sign_target);
        let signer = recover_address(&digest, signature)?;
        trace!(signer = %address_hex(&signer), "[s4] Recovered envelope signer");
        Ok(signer)
    }
}

/// Sign the envelope of `(address, slot_id, record)` with `signing_key`.
///
/// The write is only accepted when `signing_key` belongs to `address`.
pub fn sign_envelope(
    signing_key: &SigningKey,
    address: &Address,
    slot_id: SlotId,
    record: &Record,
) -> Result<Vec<u8>, EnvelopeError> {
    let target = canonical_json(address, slot_id, record)?;
    sign_prehash(&personal_message_hash(&target), signing_key)
}
