//! ElGamal-in-the-exponent encryption over the Ristretto group.
//!
//! Plaintext `m` is encoded as `g^m`, so ciphertext addition corresponds to
//! plaintext addition. Decryption solves a short discrete log by brute
//! force over a bounded window, matching the protocol's balance-size
//! assumption.

use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::Identity;
use rand_core::{CryptoRng, RngCore};

use crate::error::CryptoError;
use crate::group::{point_base, point_ct_eq, point_from_bytes, point_to_bytes, scalar_random};

/// ElGamal ciphertext `(C1, C2) = (g^r, g^m * pk^r)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Ciphertext {
    pub c1: RistrettoPoint,
    pub c2: RistrettoPoint,
}

impl Ciphertext {
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&point_to_bytes(&self.c1));
        out[32..].copy_from_slice(&point_to_bytes(&self.c2));
        out
    }

    pub fn from_bytes(bytes: &[u8; 64]) -> Result<Self, CryptoError> {
        let mut c1b = [0u8; 32];
        let mut c2b = [0u8; 32];
        c1b.copy_from_slice(&bytes[..32]);
        c2b.copy_from_slice(&bytes[32..]);
        Ok(Self {
            c1: point_from_bytes(&c1b).map_err(|_| CryptoError::InvalidCiphertext)?,
            c2: point_from_bytes(&c2b).map_err(|_| CryptoError::InvalidCiphertext)?,
        })
    }
}

/// The ciphertext plus the ElGamal randomness `r` used to produce it.
///
/// Kept separate from [`Ciphertext`] so the randomness never leaks past the
/// prover closure that needs it (ZK-EQ) — the public wire type only ever
/// carries `Ciphertext`.
pub struct EncryptionWitness {
    pub ciphertext: Ciphertext,
    pub randomness: Scalar,
}

/// Encode a signed plaintext as a scalar: `m` for `m >= 0`, `-|m|` otherwise.
pub fn scalar_from_i64(m: i64) -> Scalar {
    if m >= 0 {
        Scalar::from(m as u64)
    } else {
        -Scalar::from(m.unsigned_abs())
    }
}

/// `sk <- uniform`, `pk = g^sk`.
pub fn keygen<R: RngCore + CryptoRng>(rng: &mut R) -> (Scalar, RistrettoPoint) {
    let sk = scalar_random(rng);
    let pk = sk * point_base();
    (sk, pk)
}

fn encrypt_with_randomness(pk: &RistrettoPoint, m: i64, r: Scalar) -> EncryptionWitness {
    let g = point_base();
    let c1 = r * g;
    let c2 = scalar_from_i64(m) * g + r * pk;
    EncryptionWitness {
        ciphertext: Ciphertext { c1, c2 },
        randomness: r,
    }
}

/// Encrypt `m` under `pk`, keeping the randomness around for a proof.
///
/// Use this from prover code; everything else should call [`encrypt`].
pub fn encrypt_with_witness<R: RngCore + CryptoRng>(
    pk: &RistrettoPoint,
    m: i64,
    rng: &mut R,
) -> EncryptionWitness {
    let r = scalar_random(rng);
    encrypt_with_randomness(pk, m, r)
}

/// Public encryption API: only the ciphertext leaves this function.
pub fn encrypt<R: RngCore + CryptoRng>(pk: &RistrettoPoint, m: i64, rng: &mut R) -> Ciphertext {
    encrypt_with_witness(pk, m, rng).ciphertext
}

/// Decrypt by brute-force discrete log over `{-m_max ..= m_max}`.
pub fn decrypt(sk: &Scalar, ct: &Ciphertext, m_max: u32) -> Result<i64, CryptoError> {
    let target = ct.c2 - sk * ct.c1;
    let g = point_base();

    if point_ct_eq(&target, &RistrettoPoint::identity()) {
        return Ok(0);
    }

    let mut pos = g;
    let mut neg = -g;
    for i in 1..=i64::from(m_max) {
        if point_ct_eq(&target, &pos) {
            return Ok(i);
        }
        if point_ct_eq(&target, &neg) {
            return Ok(-i);
        }
        pos += g;
        neg -= g;
    }

    Err(CryptoError::BalanceOutOfRange(u64::from(m_max)))
}

/// Componentwise ciphertext addition; decrypts to the sum of plaintexts.
pub fn add(a: &Ciphertext, b: &Ciphertext) -> Ciphertext {
    Ciphertext {
        c1: a.c1 + b.c1,
        c2: a.c2 + b.c2,
    }
}

/// Negate both components: if `ct` encrypts `m` under randomness `r`, the
/// result encrypts `-m` under randomness `-r`, still under the same key.
/// Lets a debit be expressed as `add(balance, negate(credit_ciphertext))`
/// with no extra proof, since negation is a public operation.
pub fn negate(ct: &Ciphertext) -> Ciphertext {
    Ciphertext {
        c1: -ct.c1,
        c2: -ct.c2,
    }
}
