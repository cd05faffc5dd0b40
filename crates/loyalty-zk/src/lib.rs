//! Non-interactive Σ-protocols for the loyalty-points transaction.
//!
//! Two proofs, both Fiat-Shamir'd through
//! [`loyalty_crypto::group::hash_to_scalar`] so the transcript layout lives
//! in one place:
//!
//! - [`eq`]: ciphertext equality — the client proves two ciphertexts,
//!   encrypted with independent randomness, carry the same plaintext.
//! - [`dec`]: decryption correctness — the server proves a claimed
//!   plaintext is the correct decryption of a ciphertext under its secret
//!   key, without revealing the key.

pub mod dec;
pub mod eq;
pub mod error;

pub use dec::{prove_dec, verify_dec, DecProof};
pub use eq::{prove_eq, verify_eq, EqProof};
pub use error::ZkError;
