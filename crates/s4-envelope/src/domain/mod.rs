//! # Domain Layer
//!
//! Canonical envelope encoding and secp256k1 recovery.

pub mod canonical;
pub mod ecdsa;

pub use canonical::{canonical_json, keccak256, personal_message_hash, Hash};
pub use ecdsa::{address_from_pubkey, recover_address, sign_prehash, SIGNATURE_LENGTH};
