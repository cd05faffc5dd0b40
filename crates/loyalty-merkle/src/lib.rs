//! Append-only Merkle registry of registered users.
//!
//! A binary tree over SHA-256 with domain-separated leaf/internal hashing,
//! serving as a binding public commitment to the current user set. Only the
//! server mutates it (on registration); both sides read it to verify
//! inclusion of a barcode owner's record.
//!
//! Unlike a CryptoNote-style `tree_hash` that only ever hands back a root,
//! this registry also rebuilds every level bottom-up on demand (on
//! `root()`/`prove_inclusion`) so it can hand out `MerkleProof`s too, with
//! domain-separated leaf/internal hashing closing the second-preimage gap
//! a plain recursive hash would leave open.

pub mod error;
pub mod tree;

pub use error::MerkleError;
pub use tree::{verify_inclusion, MerkleProof, MerkleRegistry, Side, EMPTY_ROOT};
