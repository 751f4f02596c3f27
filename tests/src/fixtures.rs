//! Shared fixtures: real secp256k1 writers and test logging.

use k256::ecdsa::SigningKey;
use s4_envelope::{address_from_pubkey, sign_envelope};
use s4_storage::{Address, Record, SlotId, SystemTimeSource, TimeSource};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install an env-filtered subscriber once per test binary (`RUST_LOG=s4=debug`).
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// A slot owner holding a secp256k1 key.
pub struct Writer {
    key: SigningKey,
    pub address: Address,
}

impl Writer {
    pub fn random() -> Self {
        let key = SigningKey::random(&mut rand::thread_rng());
        let address = address_from_pubkey(key.verifying_key());
        Self { key, address }
    }

    /// Sign a write to this writer's own slot.
    pub fn sign(&self, slot_id: SlotId, record: &Record) -> Vec<u8> {
        self.sign_for(&self.address, slot_id, record)
    }

    /// Sign a write claiming to be `address`.
    pub fn sign_for(&self, address: &Address, slot_id: SlotId, record: &Record) -> Vec<u8> {
        sign_envelope(&self.key, address, slot_id, record).expect("signing with a valid key")
    }
}

/// Wall-clock milliseconds.
pub fn now_millis() -> i64 {
    SystemTimeSource.now_millis()
}
