//! Binary Merkle tree with domain-separated hashing and inclusion proofs.
//!
//! Leaf hash: `SHA256(0x00 || leaf_bytes)`.
//! Internal hash: `SHA256(0x01 || left || right)`.
//!
//! The two domain tags stop a malicious server from passing off an internal
//! node as a leaf (or vice versa) to forge an inclusion proof.
//!
//! An unpaired node at the right edge of a level is promoted to the next
//! level unchanged rather than duplicated; `prove_inclusion` simply emits no
//! sibling step at that level for the promoted node.

use sha2::{Digest, Sha256};

use crate::error::MerkleError;

/// Root of the empty tree (no users registered yet).
pub const EMPTY_ROOT: [u8; 32] = [0u8; 32];

const LEAF_TAG: u8 = 0x00;
const NODE_TAG: u8 = 0x01;

fn leaf_hash(leaf_bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update([LEAF_TAG]);
    hasher.update(leaf_bytes);
    hasher.finalize().into()
}

fn internal_hash(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update([NODE_TAG]);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Which side of its parent a sibling digest sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// An inclusion proof: the sibling digest and side at each level from the
/// leaf up to (but not including) the root.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MerkleProof {
    pub siblings: Vec<(Side, [u8; 32])>,
}

/// Append-only registry of leaves, rebuilt bottom-up on every read.
///
/// The protocol's registry sizes (tens of thousands of users per
/// `benchmarks_updated.py`) make a full rebuild on `root()`/`prove_inclusion`
/// cheap enough; there is no requirement here for an incrementally-updated
/// tree.
#[derive(Clone, Debug, Default)]
pub struct MerkleRegistry {
    leaves: Vec<Vec<u8>>,
}

impl MerkleRegistry {
    pub fn new() -> Self {
        Self { leaves: Vec::new() }
    }

    /// Append a new leaf (its canonical encoding), returning its index.
    pub fn append(&mut self, leaf_bytes: Vec<u8>) -> usize {
        self.leaves.push(leaf_bytes);
        self.leaves.len() - 1
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    fn levels(&self) -> Vec<Vec<[u8; 32]>> {
        let mut current: Vec<[u8; 32]> =
            self.leaves.iter().map(|l| leaf_hash(l)).collect();
        let mut levels = vec![current.clone()];
        while current.len() > 1 {
            let mut next = Vec::with_capacity(current.len().div_ceil(2));
            let mut i = 0;
            while i < current.len() {
                if i + 1 < current.len() {
                    next.push(internal_hash(&current[i], &current[i + 1]));
                } else {
                    next.push(current[i]);
                }
                i += 2;
            }
            levels.push(next.clone());
            current = next;
        }
        levels
    }

    /// Current Merkle root, or [`EMPTY_ROOT`] if no leaves have been
    /// appended.
    pub fn root(&self) -> [u8; 32] {
        if self.leaves.is_empty() {
            return EMPTY_ROOT;
        }
        let levels = self.levels();
        levels.last().and_then(|l| l.first()).copied().unwrap_or(EMPTY_ROOT)
    }

    /// Build an inclusion proof for the leaf at `index`.
    pub fn prove_inclusion_at(&self, index: usize) -> Result<MerkleProof, MerkleError> {
        if index >= self.leaves.len() {
            return Err(MerkleError::LeafNotFound);
        }
        let levels = self.levels();
        let mut idx = index;
        let mut siblings = Vec::new();
        for level in &levels[..levels.len() - 1] {
            let is_right = idx % 2 == 1;
            let sib_idx = if is_right { idx - 1 } else { idx + 1 };
            if sib_idx < level.len() {
                let side = if is_right { Side::Left } else { Side::Right };
                siblings.push((side, level[sib_idx]));
            }
            idx /= 2;
        }
        Ok(MerkleProof { siblings })
    }

    /// Build an inclusion proof for a leaf by its raw (pre-hash) bytes.
    pub fn prove_inclusion(&self, leaf_bytes: &[u8]) -> Result<MerkleProof, MerkleError> {
        let index = self
            .leaves
            .iter()
            .position(|l| l.as_slice() == leaf_bytes)
            .ok_or(MerkleError::LeafNotFound)?;
        self.prove_inclusion_at(index)
    }
}

/// Verify that `leaf_bytes` is included under `root` per `proof`.
///
/// Free function (not a method): verification only needs the leaf, the
/// claimed root, and the proof itself — no access to the registry.
pub fn verify_inclusion(leaf_bytes: &[u8], root: &[u8; 32], proof: &MerkleProof) -> bool {
    let mut current = leaf_hash(leaf_bytes);
    for (side, sibling) in &proof.siblings {
        current = match side {
            Side::Left => internal_hash(sibling, &current),
            Side::Right => internal_hash(&current, sibling),
        };
    }
    current == *root
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tree_root_is_the_defined_constant() {
        let reg = MerkleRegistry::new();
        assert_eq!(reg.root(), EMPTY_ROOT);
    }

    #[test]
    fn single_leaf_root_is_its_leaf_hash() {
        let mut reg = MerkleRegistry::new();
        reg.append(b"alice".to_vec());
        assert_eq!(reg.root(), leaf_hash(b"alice"));
    }

    #[test]
    fn inclusion_proof_round_trips_for_every_leaf_odd_count() {
        let mut reg = MerkleRegistry::new();
        for i in 0..7u8 {
            reg.append(vec![i; 8]);
        }
        let root = reg.root();
        for i in 0..7u8 {
            let leaf = vec![i; 8];
            let proof = reg.prove_inclusion(&leaf).unwrap();
            assert!(verify_inclusion(&leaf, &root, &proof));
        }
    }

    #[test]
    fn inclusion_proof_round_trips_for_every_leaf_even_count() {
        let mut reg = MerkleRegistry::new();
        for i in 0..8u8 {
            reg.append(vec![i; 8]);
        }
        let root = reg.root();
        for i in 0..8u8 {
            let leaf = vec![i; 8];
            let proof = reg.prove_inclusion(&leaf).unwrap();
            assert!(verify_inclusion(&leaf, &root, &proof));
        }
    }

    #[test]
    fn inclusion_proof_rejects_wrong_leaf() {
        let mut reg = MerkleRegistry::new();
        reg.append(b"alice".to_vec());
        reg.append(b"bob".to_vec());
        let root = reg.root();
        let proof = reg.prove_inclusion(b"alice").unwrap();
        assert!(!verify_inclusion(b"mallory", &root, &proof));
    }

    #[test]
    fn inclusion_proof_rejects_wrong_root() {
        let mut reg = MerkleRegistry::new();
        reg.append(b"alice".to_vec());
        reg.append(b"bob".to_vec());
        reg.append(b"carol".to_vec());
        let proof = reg.prove_inclusion(b"bob").unwrap();
        assert!(!verify_inclusion(b"bob", &EMPTY_ROOT, &proof));
    }

    #[test]
    fn appending_changes_the_root() {
        let mut reg = MerkleRegistry::new();
        reg.append(b"alice".to_vec());
        let r1 = reg.root();
        reg.append(b"bob".to_vec());
        let r2 = reg.root();
        assert_ne!(r1, r2);
    }

    #[test]
    fn leaf_and_internal_domains_do_not_collide() {
        // A two-byte internal preimage must not equal a leaf hash of the
        // same two bytes, since the tags differ.
        let as_leaf = leaf_hash(&[0xAA, 0xBB]);
        let mut hasher = Sha256::new();
        hasher.update([NODE_TAG]);
        hasher.update([0xAA, 0xBB]);
        let as_node: [u8; 32] = hasher.finalize().into();
        assert_ne!(as_leaf, as_node);
    }

    #[test]
    fn unknown_leaf_errors() {
        let mut reg = MerkleRegistry::new();
        reg.append(b"alice".to_vec());
        assert!(matches!(
            reg.prove_inclusion(b"mallory"),
            Err(MerkleError::LeafNotFound)
        ));
    }
}
