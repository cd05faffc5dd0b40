//! Messages exchanged over the 5-message transaction protocol and the
//! 2-message balance-settlement protocol.
//!
//! Transport, framing, and session authentication are out of scope here
//! (left to whatever carries these structs); this module only fixes their
//! logical contents. Every message past step 1 carries the transaction's
//! `tx_id` (the step-1 commitment) so either side can route it to the
//! right entry in its own `tx_id`-keyed scratch map, since concurrent
//! transactions are the default.

use curve25519_dalek::ristretto::RistrettoPoint;
use loyalty_crypto::Ciphertext;
use loyalty_merkle::MerkleProof;
use loyalty_zk::{DecProof, EqProof};

use crate::scratch::{TxId, MASK_LEN};

/// Step 1, client -> server: open a transaction, committing to a secret
/// index `i_c` without revealing it. `commit_ic` doubles as the tx_id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TxHelloMsg {
    pub sender_uid: u64,
    pub commit_ic: TxId,
}

/// Step 2, server -> client: the server's own random index, revealed in
/// the clear since the client already committed to `i_c` in step 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TxHelloResponseMsg {
    pub tx_id: TxId,
    pub i_s: u64,
}

/// Step 3, client -> server: open the step-1 commitment so the server can
/// check the client didn't change its mind about `i_c` after learning
/// `i_s`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TxComputeIdMsg {
    pub tx_id: TxId,
    pub i_c: u64,
    pub r_c: [u8; MASK_LEN],
}

/// Step 4, server -> client: having verified the opening and computed
/// `uid_b = (i_c + i_s) mod n_users`, the server hands back that user's
/// barcode, public key, current balance ciphertext, and an inclusion proof
/// binding them to the published registry root.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TxBarcodeGenMsg {
    pub tx_id: TxId,
    pub uid_b: u64,
    pub barcode: u64,
    pub pk_b: RistrettoPoint,
    pub balance_b: Ciphertext,
    pub leaf_bytes: Vec<u8>,
    pub merkle_proof: MerkleProof,
}

/// Step 5, client -> server: the actual transfer. `delta_s` debits the
/// sender (negated server-side before being added to its balance),
/// `delta_b` credits `uid_b`; `proof` shows both encrypt the same point
/// quantity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TxMsg {
    pub tx_id: TxId,
    pub sender_uid: u64,
    pub uid_b: u64,
    pub delta_s: Ciphertext,
    pub delta_b: Ciphertext,
    pub proof: EqProof,
}

/// Settlement step 1, client -> server: ask for the current balance
/// ciphertext.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SettleHelloMsg {
    pub uid: u64,
}

/// Settlement step 2, server -> client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SettleHelloResponseMsg {
    pub balance: Ciphertext,
}

/// Settlement step 3, client -> server: the client discloses its
/// plaintext balance and proves it is the genuine decryption of the
/// ciphertext it was handed, without revealing its secret key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SettleFinalizeMsg {
    pub uid: u64,
    pub balance_plaintext: i64,
    pub proof: DecProof,
}
