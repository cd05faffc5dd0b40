//! Ciphertext-equality proof.
//!
//! Statement: given two public keys `pk_s`, `pk_b` and two ElGamal
//! ciphertexts `Cs` (under `pk_s`) and `Cb` (under `pk_b`), the prover knows
//! a plaintext `p` and randomness `rs`, `rb` such that
//!
//! ```text
//! Cs = (g^rs, g^p * pk_s^rs)
//! Cb = (g^rb, g^p * pk_b^rb)
//! ```
//!
//! i.e. both ciphertexts encrypt the same `p`, each under its own key. This
//! is how a client proves a transaction moves the same point quantity out
//! of the sender's balance (under `pk_s`) as it moves into the recipient's
//! balance (under `pk_b`), without revealing `p` to the server.
//!
//! Σ-protocol, Fiat-Shamir'd:
//!
//! - Prover picks `k_p, k_rs, k_rb <- Z_ℓ` and sends
//!   `T_s1 = g^k_rs`, `T_s2 = pk_s^k_rs * g^k_p`,
//!   `T_b1 = g^k_rb`, `T_b2 = pk_b^k_rb * g^k_p`.
//! - Challenge `c = H("ZK_EQ", pk_s, pk_b, Cs, Cb, T_s1, T_s2, T_b1, T_b2)`.
//! - Responses `z_p = k_p + c*p`, `z_rs = k_rs + c*rs`, `z_rb = k_rb + c*rb`.
//!
//! Verification checks:
//!
//! ```text
//! g^z_rs             == T_s1 + c*Cs.c1
//! pk_s^z_rs * g^z_p  == T_s2 + c*Cs.c2
//! g^z_rb             == T_b1 + c*Cb.c1
//! pk_b^z_rb * g^z_p  == T_b2 + c*Cb.c2
//! ```

use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use rand_core::{CryptoRng, RngCore};

use loyalty_crypto::{
    hash_to_scalar, point_base, point_ct_eq, point_from_bytes, point_to_bytes, scalar_from_i64,
    scalar_random, Ciphertext, EncryptionWitness,
};

use crate::error::ZkError;

const DOMAIN: &[u8] = b"ZK_EQ";

/// Ciphertext-equality proof transcript.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EqProof {
    pub t_s1: RistrettoPoint,
    pub t_s2: RistrettoPoint,
    pub t_b1: RistrettoPoint,
    pub t_b2: RistrettoPoint,
    pub z_p: Scalar,
    pub z_rs: Scalar,
    pub z_rb: Scalar,
}

impl EqProof {
    pub fn to_bytes(&self) -> [u8; 7 * 32] {
        let mut out = [0u8; 7 * 32];
        out[0..32].copy_from_slice(&point_to_bytes(&self.t_s1));
        out[32..64].copy_from_slice(&point_to_bytes(&self.t_s2));
        out[64..96].copy_from_slice(&point_to_bytes(&self.t_b1));
        out[96..128].copy_from_slice(&point_to_bytes(&self.t_b2));
        out[128..160].copy_from_slice(self.z_p.as_bytes());
        out[160..192].copy_from_slice(self.z_rs.as_bytes());
        out[192..224].copy_from_slice(self.z_rb.as_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8; 7 * 32]) -> Result<Self, ZkError> {
        let point_at = |range: std::ops::Range<usize>| -> Result<RistrettoPoint, ZkError> {
            let mut buf = [0u8; 32];
            buf.copy_from_slice(&bytes[range]);
            point_from_bytes(&buf).map_err(|_| ZkError::InvalidProofEq)
        };
        let scalar_at = |range: std::ops::Range<usize>| -> Result<Scalar, ZkError> {
            let mut buf = [0u8; 32];
            buf.copy_from_slice(&bytes[range]);
            Option::from(Scalar::from_canonical_bytes(buf)).ok_or(ZkError::InvalidProofEq)
        };
        Ok(Self {
            t_s1: point_at(0..32)?,
            t_s2: point_at(32..64)?,
            t_b1: point_at(64..96)?,
            t_b2: point_at(96..128)?,
            z_p: scalar_at(128..160)?,
            z_rs: scalar_at(160..192)?,
            z_rb: scalar_at(192..224)?,
        })
    }
}

#[allow(clippy::too_many_arguments)]
fn challenge(
    pk_s: &RistrettoPoint,
    pk_b: &RistrettoPoint,
    cs: &Ciphertext,
    cb: &Ciphertext,
    t_s1: &RistrettoPoint,
    t_s2: &RistrettoPoint,
    t_b1: &RistrettoPoint,
    t_b2: &RistrettoPoint,
) -> Scalar {
    let pk_s_b = point_to_bytes(pk_s);
    let pk_b_b = point_to_bytes(pk_b);
    let cs_b = cs.to_bytes();
    let cb_b = cb.to_bytes();
    let t_s1_b = point_to_bytes(t_s1);
    let t_s2_b = point_to_bytes(t_s2);
    let t_b1_b = point_to_bytes(t_b1);
    let t_b2_b = point_to_bytes(t_b2);
    hash_to_scalar(
        DOMAIN,
        &[
            &pk_s_b, &pk_b_b, &cs_b, &cb_b, &t_s1_b, &t_s2_b, &t_b1_b, &t_b2_b,
        ],
    )
}

/// Prove that `ws` (under `pk_s`) and `wb` (under `pk_b`) both encrypt `p`.
pub fn prove_eq<R: RngCore + CryptoRng>(
    pk_s: &RistrettoPoint,
    pk_b: &RistrettoPoint,
    p: i64,
    ws: &EncryptionWitness,
    wb: &EncryptionWitness,
    rng: &mut R,
) -> EqProof {
    let g = point_base();
    let k_p = scalar_random(rng);
    let k_rs = scalar_random(rng);
    let k_rb = scalar_random(rng);

    let t_s1 = k_rs * g;
    let t_s2 = k_rs * pk_s + k_p * g;
    let t_b1 = k_rb * g;
    let t_b2 = k_rb * pk_b + k_p * g;

    let c = challenge(
        pk_s,
        pk_b,
        &ws.ciphertext,
        &wb.ciphertext,
        &t_s1,
        &t_s2,
        &t_b1,
        &t_b2,
    );

    let p_scalar = scalar_from_i64(p);
    let z_p = k_p + c * p_scalar;
    let z_rs = k_rs + c * ws.randomness;
    let z_rb = k_rb + c * wb.randomness;

    EqProof {
        t_s1,
        t_s2,
        t_b1,
        t_b2,
        z_p,
        z_rs,
        z_rb,
    }
}

/// Verify an [`EqProof`] against `pk_s`, `pk_b` and the two ciphertexts it
/// binds.
pub fn verify_eq(
    pk_s: &RistrettoPoint,
    pk_b: &RistrettoPoint,
    cs: &Ciphertext,
    cb: &Ciphertext,
    proof: &EqProof,
) -> bool {
    let g = point_base();
    let c = challenge(
        pk_s,
        pk_b,
        cs,
        cb,
        &proof.t_s1,
        &proof.t_s2,
        &proof.t_b1,
        &proof.t_b2,
    );

    let lhs_s1 = proof.z_rs * g;
    let rhs_s1 = proof.t_s1 + c * cs.c1;
    let lhs_s2 = proof.z_rs * pk_s + proof.z_p * g;
    let rhs_s2 = proof.t_s2 + c * cs.c2;

    let lhs_b1 = proof.z_rb * g;
    let rhs_b1 = proof.t_b1 + c * cb.c1;
    let lhs_b2 = proof.z_rb * pk_b + proof.z_p * g;
    let rhs_b2 = proof.t_b2 + c * cb.c2;

    point_ct_eq(&lhs_s1, &rhs_s1)
        && point_ct_eq(&lhs_s2, &rhs_s2)
        && point_ct_eq(&lhs_b1, &rhs_b1)
        && point_ct_eq(&lhs_b2, &rhs_b2)
}
