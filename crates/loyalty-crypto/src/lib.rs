//! Group, scalar, ElGamal, and commitment primitives for the loyalty-points
//! protocol.
//!
//! Everything in this crate is pure in-memory math: no I/O, no network, no
//! persistence. Callers inject randomness (`rand_core::CryptoRng + RngCore`)
//! so tests can run against a seeded source and production code can use
//! `OsRng`.

pub mod commitment;
pub mod elgamal;
pub mod error;
pub mod group;

pub use commitment::{commit, open};
pub use elgamal::{
    add, decrypt, encrypt, encrypt_with_witness, keygen, negate, scalar_from_i64, Ciphertext,
    EncryptionWitness,
};
pub use error::CryptoError;
pub use group::{
    hash_to_scalar, point_base, point_ct_eq, point_from_bytes, point_to_bytes, scalar_from_bytes,
    scalar_random,
};
