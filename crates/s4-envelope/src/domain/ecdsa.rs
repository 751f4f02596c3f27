//! # ECDSA Recovery (secp256k1)
//!
//! Recoverable signatures over a 32-byte prehash, Ethereum layout:
//! 65 bytes `r || s || v`.
//!
//! ## Security Notes
//!
//! - **Malleability Prevention (EIP-2)**: high-S signatures are rejected
//! - **Recovery ID**: `v` in {0, 1, 27, 28}
//! - R and S range checks are delegated to `k256::ecdsa::Signature::from_slice`

use super::canonical::{keccak256, Hash};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use s4_storage::{Address, EnvelopeError};

/// Length of a serialized recoverable signature.
pub const SIGNATURE_LENGTH: usize = 65;

/// Recover the signer's Ethereum address from a 65-byte signature.
pub fn recover_address(message_hash: &Hash, signature: &[u8]) -> Result<Address, EnvelopeError> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(EnvelopeError::InvalidFormat(format!(
            "expected {SIGNATURE_LENGTH} bytes, got {}",
            signature.len()
        )));
    }

    let recovery_id = parse_recovery_id(signature[64])?;

    let sig = Signature::from_slice(&signature[..64])
        .map_err(|e| EnvelopeError::InvalidFormat(e.to_string()))?;

    // `normalize_s` returns `Some` only for high-S input.
    if sig.normalize_s().is_some() {
        return Err(EnvelopeError::InvalidFormat("high S value".to_string()));
    }

    let recovered_key = VerifyingKey::recover_from_prehash(message_hash, &sig, recovery_id)
        .map_err(|_| EnvelopeError::RecoveryFailed)?;

    Ok(address_from_pubkey(&recovered_key))
}

/// Sign a prehash, producing `r || s || v` with low S and `v` in {27, 28}.
pub fn sign_prehash(
    message_hash: &Hash,
    signing_key: &SigningKey,
) -> Result<Vec<u8>, EnvelopeError> {
    let (mut sig, mut recovery_id) = signing_key
        .sign_prehash_recoverable(message_hash)
        .map_err(|e| EnvelopeError::Signing(e.to_string()))?;

    if let Some(normalized) = sig.normalize_s() {
        sig = normalized;
        recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
    }

    let mut bytes = Vec::with_capacity(SIGNATURE_LENGTH);
    bytes.extend_from_slice(&sig.to_bytes());
    bytes.push(27 + recovery_id.to_byte());
    Ok(bytes)
}

/// Derive Ethereum address from public key.
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let pubkey_bytes = public_key.to_encoded_point(false);

    // Keccak256 of the uncompressed key without the 0x04 prefix
    let hash = keccak256(&pubkey_bytes.as_bytes()[1..]);

    // Take last 20 bytes as address
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Parse recovery ID from v value.
fn parse_recovery_id(v: u8) -> Result<RecoveryId, EnvelopeError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => {
            return Err(EnvelopeError::InvalidFormat(format!(
                "invalid recovery id {v}"
            )))
        }
    };

    RecoveryId::try_from(id)
        .map_err(|_| EnvelopeError::InvalidFormat(format!("invalid recovery id {v}")))
}
