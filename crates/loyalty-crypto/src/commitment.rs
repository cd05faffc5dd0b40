//! Hash-based commitment scheme.
//!
//! Binds the committer to a user index `i` without revealing it until
//! opening. `i` is always encoded as 8-byte little-endian before hashing,
//! so the commitment actually depends on the value of `i` rather than
//! just its length.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Random mask length, in bytes.
pub const MASK_LEN: usize = 64;

/// `SHA256(i.to_le_bytes() || r)`.
pub fn commit(i: u64, r: &[u8; MASK_LEN]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(i.to_le_bytes());
    hasher.update(r);
    hasher.finalize().into()
}

/// Recompute the commitment and compare in constant time.
pub fn open(i: u64, r: &[u8; MASK_LEN], com: &[u8; 32]) -> bool {
    commit(i, r).ct_eq(com).into()
}
