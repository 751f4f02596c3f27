//! # S4 Signature Envelope
//!
//! secp256k1/keccak256 implementation of the S4 `Envelope` port.
//!
//! ## Signing Scheme
//!
//! ```text
//! json   = {"address":"0x..","slotid":N,"payload":"0x..","version":V,"expiration":E}
//! digest = keccak256("\x19Ethereum Signed Message:\n32" || keccak256(json))
//! sig    = r || s || v     (65 bytes, low S, v in {0, 1, 27, 28})
//! ```
//!
//! The recovered signer must equal `address` for S4 to accept the write.
//!
//! ## Usage
//!
//! ```ignore
//! use s4_envelope::{sign_envelope, Secp256k1Envelope};
//!
//! let signature = sign_envelope(&signing_key, &address, slot_id, &record)?;
//! let storage = InMemoryS4Storage::new(&config, Secp256k1Envelope::new())?;
//! storage.put(&address, slot_id, &record, &signature).await?;
//! ```

pub mod domain;
pub mod envelope;

pub use domain::{address_from_pubkey, keccak256, personal_message_hash, SIGNATURE_LENGTH};
pub use envelope::{sign_envelope, Secp256k1Envelope};
