//!
//! Hashing helpers. Role keys are conventionally the Keccak-256 digest of a
//! human-readable label, so that is the only digest this crate needs.

use sha3::{Digest, Keccak256};

/// Keccak-256 (the pre-standard SHA-3 variant, not `Sha3_256`).
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into() // GenericArray<u8, N> converts to [u8; N]
}
