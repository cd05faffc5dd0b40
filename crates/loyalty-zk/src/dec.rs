//! Decryption-correctness proof.
//!
//! Statement: given `pk = g^sk`, a ciphertext `(c1, c2)`, and a claimed
//! plaintext `m`, the prover (who holds `sk`) knows `sk` such that
//!
//! ```text
//! pk      = g^sk
//! c2 - g^m = sk * c1
//! ```
//!
//! This is a standard Chaum-Pedersen equality-of-discrete-logs proof: it
//! lets the server reveal a settlement balance's plaintext without handing
//! over its secret key, while the client can still check the disclosed
//! value is genuine.
//!
//! - Prover picks `k <- Z_ℓ`, sends `T1 = g^k`, `T2 = c1^k`.
//! - Challenge `c = H("ZK_DEC", pk, c1, c2, m, T1, T2)`.
//! - Response `z = k + c*sk`.
//!
//! Verification: `g^z == T1 + c*pk` and `c1^z == T2 + c*(c2 - g^m)`.

use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use rand_core::{CryptoRng, RngCore};

use loyalty_crypto::{
    hash_to_scalar, point_base, point_ct_eq, point_from_bytes, point_to_bytes, scalar_from_i64,
    scalar_random, Ciphertext,
};

use crate::error::ZkError;

const DOMAIN: &[u8] = b"ZK_DEC";

/// Decryption-correctness proof transcript.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DecProof {
    pub t1: RistrettoPoint,
    pub t2: RistrettoPoint,
    pub z: Scalar,
}

impl DecProof {
    pub fn to_bytes(&self) -> [u8; 3 * 32] {
        let mut out = [0u8; 3 * 32];
        out[0..32].copy_from_slice(&point_to_bytes(&self.t1));
        out[32..64].copy_from_slice(&point_to_bytes(&self.t2));
        out[64..96].copy_from_slice(self.z.as_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8; 3 * 32]) -> Result<Self, ZkError> {
        let mut t1b = [0u8; 32];
        let mut t2b = [0u8; 32];
        let mut zb = [0u8; 32];
        t1b.copy_from_slice(&bytes[0..32]);
        t2b.copy_from_slice(&bytes[32..64]);
        zb.copy_from_slice(&bytes[64..96]);
        Ok(Self {
            t1: point_from_bytes(&t1b).map_err(|_| ZkError::InvalidProofDec)?,
            t2: point_from_bytes(&t2b).map_err(|_| ZkError::InvalidProofDec)?,
            z: Option::from(Scalar::from_canonical_bytes(zb)).ok_or(ZkError::InvalidProofDec)?,
        })
    }
}

fn challenge(
    pk: &RistrettoPoint,
    ct: &Ciphertext,
    m: i64,
    t1: &RistrettoPoint,
    t2: &RistrettoPoint,
) -> Scalar {
    let pk_b = point_to_bytes(pk);
    let ct_b = ct.to_bytes();
    let m_b = m.to_le_bytes();
    let t1_b = point_to_bytes(t1);
    let t2_b = point_to_bytes(t2);
    hash_to_scalar(DOMAIN, &[&pk_b, &ct_b, &m_b, &t1_b, &t2_b])
}

/// Prove that `m` is the correct decryption of `ct` under `sk` (with
/// `pk = g^sk`).
pub fn prove_dec<R: RngCore + CryptoRng>(
    sk: &Scalar,
    pk: &RistrettoPoint,
    ct: &Ciphertext,
    m: i64,
    rng: &mut R,
) -> DecProof {
    let g = point_base();
    let k = scalar_random(rng);
    let t1 = k * g;
    let t2 = k * ct.c1;

    let c = challenge(pk, ct, m, &t1, &t2);
    let z = k + c * sk;

    DecProof { t1, t2, z }
}

/// Verify a [`DecProof`] that `m` is the correct decryption of `ct` under
/// the secret key behind `pk`.
pub fn verify_dec(pk: &RistrettoPoint, ct: &Ciphertext, m: i64, proof: &DecProof) -> bool {
    let g = point_base();
    let c = challenge(pk, ct, m, &proof.t1, &proof.t2);

    let lhs1 = proof.z * g;
    let rhs1 = proof.t1 + c * pk;

    let target = ct.c2 - scalar_from_i64(m) * g;
    let lhs2 = proof.z * ct.c1;
    let rhs2 = proof.t2 + c * target;

    point_ct_eq(&lhs1, &rhs1) && point_ct_eq(&lhs2, &rhs2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loyalty_crypto::{decrypt, encrypt, keygen};
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    fn rng_from(seed: u8) -> ChaCha20Rng {
        ChaCha20Rng::from_seed([seed; 32])
    }

    #[test]
    fn honest_proof_verifies() {
        let mut rng = rng_from(1);
        let (sk, pk) = keygen(&mut rng);
        let ct = encrypt(&pk, -7, &mut rng);
        let m = decrypt(&sk, &ct, 1000).unwrap();
        let proof = prove_dec(&sk, &pk, &ct, m, &mut rng);
        assert!(verify_dec(&pk, &ct, m, &proof));
    }

    #[test]
    fn proof_rejects_wrong_plaintext() {
        let mut rng = rng_from(2);
        let (sk, pk) = keygen(&mut rng);
        let ct = encrypt(&pk, 3, &mut rng);
        let proof = prove_dec(&sk, &pk, &ct, 3, &mut rng);
        assert!(!verify_dec(&pk, &ct, 4, &proof));
    }

    #[test]
    fn proof_rejects_wrong_ciphertext() {
        let mut rng = rng_from(3);
        let (sk, pk) = keygen(&mut rng);
        let ct = encrypt(&pk, 3, &mut rng);
        let other = encrypt(&pk, 3, &mut rng);
        let proof = prove_dec(&sk, &pk, &ct, 3, &mut rng);
        assert!(!verify_dec(&pk, &other, 3, &proof));
    }

    #[test]
    fn proof_bytes_round_trip() {
        let mut rng = rng_from(4);
        let (sk, pk) = keygen(&mut rng);
        let ct = encrypt(&pk, 11, &mut rng);
        let proof = prove_dec(&sk, &pk, &ct, 11, &mut rng);
        let bytes = proof.to_bytes();
        let proof2 = DecProof::from_bytes(&bytes).unwrap();
        assert_eq!(proof, proof2);
    }
}
