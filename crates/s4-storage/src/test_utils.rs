//! Deterministic fakes for tests.
//!
//! `FakeEnvelope` stands in for a real signature scheme: a "signature" is the
//! signer address followed by a keyed digest of the sign target. Flipping any
//! byte either changes the recovered address or breaks the digest.

use crate::domain::entities::{Address, Record, SlotId, TimestampMillis};
use crate::error::EnvelopeError;
use crate::ports::outbound::{Envelope, TimeSource};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

const FAKE_SIGNATURE_LEN: usize = 20 + 8;

/// Deterministic envelope for tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct FakeEnvelope;

impl FakeEnvelope {
    /// Sign a write to `signer`'s own slot.
    pub fn sign(signer: &Address, slot_id: SlotId, record: &Record) -> Vec<u8> {
        Self::sign_as(signer, signer, slot_id, record)
    }

    /// Sign the envelope of `address` using the identity `signer`.
    ///
    /// Recovery succeeds and yields `signer`, which simulates a foreign key.
    pub fn sign_as(signer: &Address, address: &Address, slot_id: SlotId, record: &Record) -> Vec<u8> {
        let target = canonical_bytes(address, slot_id, record);
        let mut signature = Vec::with_capacity(FAKE_SIGNATURE_LEN);
        signature.extend_from_slice(signer);
        signature.extend_from_slice(&digest(signer, &target).to_be_bytes());
        signature
    }
}

impl Envelope for FakeEnvelope {
    fn sign_target(
        &self,
        address: &Address,
        slot_id: SlotId,
        record: &Record,
    ) -> Result<Vec<u8>, EnvelopeError> {
        Ok(canonical_bytes(address, slot_id, record))
    }

    fn recover_signer(
        &self,
        sign_target: &[u8],
        signature: &[u8],
    ) -> Result<Address, EnvelopeError> {
        if signature.len() != FAKE_SIGNATURE_LEN {
            return Err(EnvelopeError::InvalidFormat(format!(
                "expected {FAKE_SIGNATURE_LEN} bytes, got {}",
                signature.len()
            )));
        }

        let mut signer = [0u8; 20];
        signer.copy_from_slice(&signature[..20]);

        let mut tag = [0u8; 8];
        tag.copy_from_slice(&signature[20..]);

        // Tag must match what the embedded signer would have produced.
        if u64::from_be_bytes(tag) != digest(&signer, sign_target) {
            return Err(EnvelopeError::RecoveryFailed);
        }
        Ok(signer)
    }
}

fn canonical_bytes(address: &Address, slot_id: SlotId, record: &Record) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(20 + 4 + 8 + 8 + record.payload.len());
    bytes.extend_from_slice(address);
    bytes.extend_from_slice(&slot_id.to_be_bytes());
    bytes.extend_from_slice(&record.version.to_be_bytes());
    bytes.extend_from_slice(&record.expiration.to_be_bytes());
    bytes.extend_from_slice(&record.payload);
    bytes
}

fn digest(signer: &Address, target: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    signer.hash(&mut hasher);
    target.hash(&mut hasher);
    hasher.finish()
}

/// Manually driven clock. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualTimeSource {
    now: Arc<AtomicI64>,
}

impl ManualTimeSource {
    /// Create a clock starting at `now` (unix milliseconds).
    pub fn new(now: TimestampMillis) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(now)),
        }
    }

    /// Jump to an absolute instant.
    pub fn set(&self, now: TimestampMillis) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move forward by `millis`.
    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now_millis(&self) -> TimestampMillis {
        self.now.load(Ordering::SeqCst)
    }
}
