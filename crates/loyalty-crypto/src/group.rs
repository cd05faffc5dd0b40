//! Prime-order group and scalar layer.
//!
//! `G` is the Ristretto255 subgroup of curve25519 — the idiomatic Rust
//! stand-in for "a prime-order group over a twisted-Edwards curve at the
//! ~128-bit security level" (it sidesteps the cofactor-related pitfalls of
//! using raw Edwards points directly). All scalar arithmetic and point
//! equality below go through `curve25519-dalek`'s own constant-time types;
//! `point_ct_eq` makes the constant-time comparison explicit at call sites
//! that need it spelled out (e.g. verifier accept/reject checks).

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;

use crate::error::CryptoError;

/// Sample a uniform scalar using the full 512-bit wide-reduction path
/// (never `Scalar::from(rng.next_u64())`, which would throw away entropy).
pub fn scalar_random<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar {
    let mut bytes = [0u8; 64];
    rng.fill_bytes(&mut bytes);
    Scalar::from_bytes_mod_order_wide(&bytes)
}

/// Reduce 64 bytes of wide input to a scalar mod ℓ.
pub fn scalar_from_bytes(bytes: &[u8; 64]) -> Scalar {
    Scalar::from_bytes_mod_order_wide(bytes)
}

/// The fixed generator `g`.
pub fn point_base() -> RistrettoPoint {
    RISTRETTO_BASEPOINT_POINT
}

/// Canonical 32-byte compressed encoding of a point.
pub fn point_to_bytes(p: &RistrettoPoint) -> [u8; 32] {
    p.compress().to_bytes()
}

/// Decode a compressed point, rejecting anything that doesn't lie on the
/// Ristretto subgroup.
pub fn point_from_bytes(bytes: &[u8; 32]) -> Result<RistrettoPoint, CryptoError> {
    CompressedRistretto(*bytes)
        .decompress()
        .ok_or(CryptoError::InvalidKey)
}

/// Constant-time point equality over the compressed encoding.
pub fn point_ct_eq(a: &RistrettoPoint, b: &RistrettoPoint) -> bool {
    point_to_bytes(a).ct_eq(&point_to_bytes(b)).into()
}

/// Fiat-Shamir challenge: SHA-512 of a domain tag followed by
/// length-prefixed byte strings, reduced mod ℓ via wide reduction.
///
/// Every Σ-protocol challenge in this crate (ZK-EQ, ZK-DEC) goes through
/// this single function so the transcript layout is defined in exactly one
/// place.
pub fn hash_to_scalar(domain: &[u8], parts: &[&[u8]]) -> Scalar {
    let mut hasher = Sha512::new();
    hasher.update((domain.len() as u64).to_le_bytes());
    hasher.update(domain);
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(*part);
    }
    let digest = hasher.finalize();
    let mut wide = [0u8; 64];
    wide.copy_from_slice(&digest);
    Scalar::from_bytes_mod_order_wide(&wide)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    #[test]
    fn hash_to_scalar_is_deterministic() {
        let a = hash_to_scalar(b"ZK_EQ", &[b"foo", b"bar"]);
        let b = hash_to_scalar(b"ZK_EQ", &[b"foo", b"bar"]);
        assert_eq!(a, b);
    }

    #[test]
    fn hash_to_scalar_domain_separates() {
        let a = hash_to_scalar(b"ZK_EQ", &[b"foo"]);
        let b = hash_to_scalar(b"ZK_DEC", &[b"foo"]);
        assert_ne!(a, b);
    }

    #[test]
    fn hash_to_scalar_is_not_naively_concatenable() {
        // Length-prefixing must prevent ("ab","c") colliding with ("a","bc").
        let a = hash_to_scalar(b"dom", &[b"ab", b"c"]);
        let b = hash_to_scalar(b"dom", &[b"a", b"bc"]);
        assert_ne!(a, b);
    }

    #[test]
    fn scalar_random_is_not_constant() {
        let mut rng = ChaCha20Rng::from_seed([7u8; 32]);
        let s1 = scalar_random(&mut rng);
        let s2 = scalar_random(&mut rng);
        assert_ne!(s1, s2);
    }

    #[test]
    fn point_round_trips_through_bytes() {
        let p = point_base();
        let bytes = point_to_bytes(&p);
        let q = point_from_bytes(&bytes).unwrap();
        assert!(point_ct_eq(&p, &q));
    }

    #[test]
    fn point_from_bytes_rejects_garbage() {
        // All-0xFF is not a valid compressed Ristretto encoding.
        let bytes = [0xFFu8; 32];
        assert!(point_from_bytes(&bytes).is_err());
    }
}
