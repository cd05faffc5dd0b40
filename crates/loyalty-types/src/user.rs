//! Registered-user identity record and its Merkle-leaf encoding.

use curve25519_dalek::ristretto::RistrettoPoint;

use loyalty_crypto::point_to_bytes;

/// A registered user's public, immutable identity: its registry position,
/// its loyalty barcode, and its ElGamal public key. `barcode` is the
/// opaque 64-bit identifier printed on the physical card, visible at
/// point of sale, and is exactly the value the Merkle leaf commits to,
/// not a hash of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserRecord {
    pub uid: u64,
    pub barcode: u64,
    pub pk: RistrettoPoint,
}

/// Canonical Merkle-leaf encoding of a [`UserRecord`]:
/// `uid (8 LE) || barcode (8 LE) || pk (32)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MerkleLeaf {
    pub uid: u64,
    pub barcode: u64,
    pub pk: RistrettoPoint,
}

impl MerkleLeaf {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + 8 + 32);
        out.extend_from_slice(&self.uid.to_le_bytes());
        out.extend_from_slice(&self.barcode.to_le_bytes());
        out.extend_from_slice(&point_to_bytes(&self.pk));
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::error::TypesError> {
        if bytes.len() != 8 + 8 + 32 {
            return Err(crate::error::TypesError::Malformed("merkle leaf"));
        }
        let mut uid_bytes = [0u8; 8];
        uid_bytes.copy_from_slice(&bytes[0..8]);
        let mut barcode_bytes = [0u8; 8];
        barcode_bytes.copy_from_slice(&bytes[8..16]);
        let mut pk_bytes = [0u8; 32];
        pk_bytes.copy_from_slice(&bytes[16..48]);
        let pk = loyalty_crypto::point_from_bytes(&pk_bytes)
            .map_err(|_| crate::error::TypesError::Malformed("merkle leaf public key"))?;
        Ok(Self {
            uid: u64::from_le_bytes(uid_bytes),
            barcode: u64::from_le_bytes(barcode_bytes),
            pk,
        })
    }
}

impl From<&UserRecord> for MerkleLeaf {
    fn from(record: &UserRecord) -> Self {
        Self {
            uid: record.uid,
            barcode: record.barcode,
            pk: record.pk,
        }
    }
}

impl UserRecord {
    pub fn to_leaf_bytes(&self) -> Vec<u8> {
        MerkleLeaf::from(self).to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_bytes_round_trip() {
        let leaf = MerkleLeaf {
            uid: 12,
            barcode: 300,
            pk: loyalty_crypto::point_base(),
        };
        let bytes = leaf.to_bytes();
        let parsed = MerkleLeaf::from_bytes(&bytes).unwrap();
        assert_eq!(leaf, parsed);
    }

    #[test]
    fn leaf_encoding_has_expected_length() {
        let record = UserRecord {
            uid: 7,
            barcode: 100,
            pk: loyalty_crypto::point_base(),
        };
        assert_eq!(record.to_leaf_bytes().len(), 8 + 8 + 32);
    }

    #[test]
    fn distinct_barcodes_produce_distinct_leaves() {
        let pk = loyalty_crypto::point_base();
        let a = UserRecord {
            uid: 0,
            barcode: 100,
            pk,
        };
        let b = UserRecord {
            uid: 0,
            barcode: 200,
            pk,
        };
        assert_ne!(a.to_leaf_bytes(), b.to_leaf_bytes());
    }
}
