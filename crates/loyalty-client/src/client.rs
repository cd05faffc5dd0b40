use std::collections::HashMap;

use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use rand_core::{CryptoRng, RngCore};

use loyalty_crypto::commitment::{self, MASK_LEN};
use loyalty_crypto::{decrypt, encrypt_with_witness, keygen};
use loyalty_merkle::verify_inclusion;
use loyalty_types::user::MerkleLeaf;
use loyalty_types::wire::{TxBarcodeGenMsg, TxComputeIdMsg, TxHelloMsg, TxHelloResponseMsg, TxMsg};
use loyalty_types::{ProtocolConfig, TxId, TxScratch, UserRecord};
use loyalty_zk::{prove_dec, prove_eq};

use crate::error::ClientError;

fn uniform_below<R: RngCore>(rng: &mut R, n: u64) -> u64 {
    rng.next_u64() % n
}

/// Per-transaction progress, mirroring the 5-message handshake. There is
/// no `Idle` variant: a tx_id with no live entry in [`Client`]'s scratch
/// map simply hasn't started (or has already finished/been cancelled).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxState {
    HelloSent,
    IdComputed,
}

impl TxState {
    fn name(self) -> &'static str {
        match self {
            TxState::HelloSent => "HelloSent",
            TxState::IdComputed => "IdComputed",
        }
    }
}

struct TxEntry {
    state: TxState,
    scratch: TxScratch,
}

/// One client's protocol state: its keys, its registration, its local view
/// of the registry, and any transactions currently in flight — keyed by
/// `tx_id` so several transactions can overlap.
pub struct Client {
    config: ProtocolConfig,
    barcode: u64,
    sk: Scalar,
    pk: RistrettoPoint,
    uid: Option<u64>,
    known_users: Vec<UserRecord>,
    known_root: [u8; 32],
    txs: HashMap<TxId, TxEntry>,
}

impl Client {
    pub fn new<R: RngCore + CryptoRng>(barcode: u64, config: ProtocolConfig, rng: &mut R) -> Self {
        let (sk, pk) = keygen(rng);
        Self {
            config,
            barcode,
            sk,
            pk,
            uid: None,
            known_users: Vec::new(),
            known_root: loyalty_merkle::EMPTY_ROOT,
            txs: HashMap::new(),
        }
    }

    pub fn pk(&self) -> RistrettoPoint {
        self.pk
    }

    pub fn uid(&self) -> Option<u64> {
        self.uid
    }

    /// Current stage of `tx_id`, or `None` if it has no live entry (never
    /// started, already finalized, or cancelled).
    pub fn tx_state(&self, tx_id: &TxId) -> Option<TxState> {
        self.txs.get(tx_id).map(|e| e.state)
    }

    /// Drop a transaction's scratch state without completing it. No
    /// compensating action is needed since balances are only mutated by
    /// the server's final step of the transfer.
    pub fn cancel_tx(&mut self, tx_id: &TxId) {
        self.txs.remove(tx_id);
    }

    fn require_uid(&self) -> Result<u64, ClientError> {
        self.uid.ok_or(ClientError::NotRegistered)
    }

    fn entry(&self, tx_id: &TxId) -> Result<&TxEntry, ClientError> {
        self.txs.get(tx_id).ok_or(ClientError::UnknownTx(*tx_id))
    }

    fn require_stage(&self, tx_id: &TxId, expected: TxState) -> Result<(), ClientError> {
        let actual = self.entry(tx_id)?.state;
        if actual != expected {
            return Err(ClientError::ProtocolOrder {
                expected: expected.name(),
                actual: actual.name(),
            });
        }
        Ok(())
    }

    /// Register this client's key and barcode with the server, recording
    /// the uid the server assigns.
    pub fn register_with_server<R: RngCore + CryptoRng>(
        &mut self,
        server: &mut loyalty_server::Server,
        rng: &mut R,
    ) -> UserRecord {
        let record = server.register_user(self.barcode, self.pk, rng);
        self.uid = Some(record.uid);
        record
    }

    /// Refresh the local view of the registered-user set and its root.
    pub fn update_state(&mut self, server: &loyalty_server::Server) {
        let (users, root) = server.share_state();
        self.known_users = users;
        self.known_root = root;
    }

    /// Step 1: begin a transaction, committing to a secret index `i_c`
    /// into the locally known registry.
    pub fn process_tx_hello<R: RngCore + CryptoRng>(
        &mut self,
        rng: &mut R,
    ) -> Result<TxHelloMsg, ClientError> {
        let sender_uid = self.require_uid()?;
        if self.known_users.is_empty() {
            return Err(ClientError::EmptyRegistry);
        }

        let i_c = uniform_below(rng, self.known_users.len() as u64);
        let mut r_c = [0u8; MASK_LEN];
        rng.fill_bytes(&mut r_c);
        let tx_id = commitment::commit(i_c, &r_c);

        let mut scratch = TxScratch::new();
        scratch.sender_uid = Some(sender_uid);
        scratch.commit_ic = Some(tx_id);
        scratch.i_c = Some(i_c);
        scratch.r_c = Some(r_c);
        self.txs.insert(
            tx_id,
            TxEntry {
                state: TxState::HelloSent,
                scratch,
            },
        );

        Ok(TxHelloMsg {
            sender_uid,
            commit_ic: tx_id,
        })
    }

    /// Step 3: combine the server's random contribution with the client's
    /// own, pinning down the recipient, and open the step-1 commitment.
    pub fn process_tx_compute_id(
        &mut self,
        resp: TxHelloResponseMsg,
    ) -> Result<TxComputeIdMsg, ClientError> {
        let tx_id = resp.tx_id;
        self.require_stage(&tx_id, TxState::HelloSent)?;

        let entry = self.txs.get_mut(&tx_id).ok_or(ClientError::UnknownTx(tx_id))?;
        let i_c = entry.scratch.i_c.expect("set in process_tx_hello");
        let r_c = entry.scratch.r_c.expect("set in process_tx_hello");

        let uid_b = (i_c + resp.i_s) % self.known_users.len() as u64;
        entry.scratch.i_s = Some(resp.i_s);
        entry.scratch.uid_b = Some(uid_b);
        entry.state = TxState::IdComputed;

        Ok(TxComputeIdMsg { tx_id, i_c, r_c })
    }

    /// Step 5: verify the server's proof that `barcode_gen` genuinely
    /// refers to the selected registry position, then build the transfer.
    /// Fails with [`ClientError::PointsOutOfRange`] before any ciphertext
    /// is produced if `|points|` exceeds the configured `m_max`.
    pub fn process_tx<R: RngCore + CryptoRng>(
        &mut self,
        barcode_gen: TxBarcodeGenMsg,
        points: i64,
        rng: &mut R,
    ) -> Result<TxMsg, ClientError> {
        let sender_uid = self.require_uid()?;
        let tx_id = barcode_gen.tx_id;
        self.require_stage(&tx_id, TxState::IdComputed)?;

        if points.unsigned_abs() > u64::from(self.config.m_max) {
            return Err(ClientError::PointsOutOfRange(points));
        }

        let expected_uid_b = self.entry(&tx_id)?.scratch.uid_b.expect("set in process_tx_compute_id");
        if expected_uid_b != barcode_gen.uid_b {
            return Err(ClientError::UidMismatch);
        }

        if !verify_inclusion(&barcode_gen.leaf_bytes, &self.known_root, &barcode_gen.merkle_proof) {
            return Err(ClientError::InvalidProofMerkle);
        }
        let leaf = MerkleLeaf::from_bytes(&barcode_gen.leaf_bytes)?;
        if leaf.uid != barcode_gen.uid_b || leaf.barcode != barcode_gen.barcode || leaf.pk != barcode_gen.pk_b {
            return Err(ClientError::LeafMismatch);
        }

        let ws = encrypt_with_witness(&self.pk, points, rng);
        let wb = encrypt_with_witness(&barcode_gen.pk_b, points, rng);
        let proof = prove_eq(&self.pk, &barcode_gen.pk_b, points, &ws, &wb, rng);

        self.txs.remove(&tx_id);

        Ok(TxMsg {
            tx_id,
            sender_uid,
            uid_b: barcode_gen.uid_b,
            delta_s: ws.ciphertext,
            delta_b: wb.ciphertext,
            proof,
        })
    }

    /// Decrypt this client's current balance without settling it (no proof
    /// is produced and the server's ciphertext is left untouched).
    pub fn view_balance(&self, server: &loyalty_server::Server) -> Result<i64, ClientError> {
        let uid = self.require_uid()?;
        let hello = server.settle_balance_hello(uid)?;
        Ok(decrypt(&self.sk, &hello.balance, self.config.m_max)?)
    }

    /// Ask the server for this client's current balance, decrypt it, and
    /// prove the decryption is genuine so the server can finalize
    /// (zeroing) the settled balance.
    pub fn settle_balance<R: RngCore + CryptoRng>(
        &mut self,
        server: &mut loyalty_server::Server,
        rng: &mut R,
    ) -> Result<i64, ClientError> {
        let uid = self.require_uid()?;
        let hello = server.settle_balance_hello(uid)?;
        let m = decrypt(&self.sk, &hello.balance, self.config.m_max)?;
        let proof = prove_dec(&self.sk, &self.pk, &hello.balance, m, rng);
        server.settle_balance_finalize(
            loyalty_types::wire::SettleFinalizeMsg {
                uid,
                balance_plaintext: m,
                proof,
            },
            rng,
        )?;
        Ok(m)
    }
}
