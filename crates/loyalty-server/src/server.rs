use std::collections::HashMap;

use curve25519_dalek::ristretto::RistrettoPoint;
use rand_core::{CryptoRng, RngCore};

use loyalty_crypto::{add, encrypt, negate};
use loyalty_merkle::MerkleRegistry;
use loyalty_types::wire::{
    SettleFinalizeMsg, SettleHelloResponseMsg, TxBarcodeGenMsg, TxComputeIdMsg, TxHelloMsg,
    TxHelloResponseMsg, TxMsg,
};
use loyalty_types::{ProtocolConfig, TxId, TxScratch, UserRecord};
use loyalty_zk::{verify_dec, verify_eq};

use crate::error::ServerError;

/// Pick a uniform value in `0..n` from `rng`. Modulo bias is negligible at
/// the registry sizes this protocol targets and is not a security-relevant
/// parameter (the coin-flip's unpredictability comes from neither party
/// controlling the other's contribution, not from perfect uniformity).
fn uniform_below<R: RngCore>(rng: &mut R, n: u64) -> u64 {
    rng.next_u64() % n
}

/// Server-side protocol state: the user registry, per-user balances, and
/// any transactions currently mid-handshake. Transactions are keyed by
/// `tx_id` (the shopper's step-1 commitment) rather than by uid, so a
/// single user may have several transactions in flight at once.
pub struct Server {
    config: ProtocolConfig,
    registry: MerkleRegistry,
    users: Vec<UserRecord>,
    balances: Vec<loyalty_crypto::Ciphertext>,
    tx_scratch: HashMap<TxId, TxScratch>,
}

impl Server {
    pub fn new(config: ProtocolConfig) -> Self {
        Self {
            config,
            registry: MerkleRegistry::new(),
            users: Vec::new(),
            balances: Vec::new(),
            tx_scratch: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn root(&self) -> [u8; 32] {
        self.registry.root()
    }

    pub fn user_count(&self) -> u64 {
        self.users.len() as u64
    }

    /// Register a new client, assigning it the next sequential uid. `pk`
    /// is the client's ElGamal public key; `barcode` is its loyalty card's
    /// (public) identifier.
    pub fn register_user<R: RngCore + CryptoRng>(
        &mut self,
        barcode: u64,
        pk: RistrettoPoint,
        rng: &mut R,
    ) -> UserRecord {
        let uid = self.users.len() as u64;
        let record = UserRecord { uid, barcode, pk };
        self.registry.append(record.to_leaf_bytes());
        self.users.push(record);
        self.balances.push(encrypt(&pk, 0, rng));
        log::debug!("registered uid {uid} (barcode {barcode}), root={}", hex::encode(self.root()));
        record
    }

    /// Snapshot of the current registry and root, for clients to sync
    /// their local view against (`Client::update_state`).
    pub fn share_state(&self) -> (Vec<UserRecord>, [u8; 32]) {
        (self.users.clone(), self.root())
    }

    fn user(&self, uid: u64) -> Result<&UserRecord, ServerError> {
        self.users.get(uid as usize).ok_or(ServerError::UserNotFound(uid))
    }

    /// Step 2: respond to a transaction hello with the server's own random
    /// contribution to the coin flip.
    pub fn process_tx_hello_response<R: RngCore + CryptoRng>(
        &mut self,
        msg: TxHelloMsg,
        rng: &mut R,
    ) -> Result<TxHelloResponseMsg, ServerError> {
        if self.users.is_empty() {
            return Err(ServerError::EmptyRegistry);
        }
        self.user(msg.sender_uid)?;

        let tx_id = msg.commit_ic;
        if self.tx_scratch.contains_key(&tx_id) {
            return Err(ServerError::DuplicateTx);
        }

        let i_s = uniform_below(rng, self.user_count());
        let mut scratch = TxScratch::new();
        scratch.sender_uid = Some(msg.sender_uid);
        scratch.commit_ic = Some(tx_id);
        scratch.i_s = Some(i_s);
        self.tx_scratch.insert(tx_id, scratch);

        log::debug!("tx {}: hello from uid {}", hex::encode(tx_id), msg.sender_uid);
        Ok(TxHelloResponseMsg { tx_id, i_s })
    }

    /// Step 4: verify the client's commitment opening, combine both coin
    /// flip contributions to select the recipient, and hand back proof of
    /// its registry membership.
    pub fn process_tx_barcode_gen(&mut self, msg: TxComputeIdMsg) -> Result<TxBarcodeGenMsg, ServerError> {
        let tx_id = msg.tx_id;
        let n_users = self.user_count();

        let (commit_ic, i_s) = {
            let scratch = self.tx_scratch.get(&tx_id).ok_or(ServerError::UnknownTx(tx_id))?;
            if scratch.uid_b.is_some() {
                // barcode-gen already ran for this tx_id.
                return Err(ServerError::ProtocolOrder);
            }
            let commit_ic = scratch.commit_ic.ok_or(ServerError::ProtocolOrder)?;
            let i_s = scratch.i_s.ok_or(ServerError::ProtocolOrder)?;
            (commit_ic, i_s)
        };

        if !loyalty_crypto::commitment::open(msg.i_c, &msg.r_c, &commit_ic) {
            log::warn!("tx {}: bad commitment opening", hex::encode(tx_id));
            self.tx_scratch.remove(&tx_id);
            return Err(ServerError::BadCommitment);
        }

        let uid_b = (msg.i_c + i_s) % n_users;
        {
            let scratch = self.tx_scratch.get_mut(&tx_id).ok_or(ServerError::UnknownTx(tx_id))?;
            scratch.i_c = Some(msg.i_c);
            scratch.r_c = Some(msg.r_c);
            scratch.uid_b = Some(uid_b);
        }

        let user_b = self.user(uid_b)?;
        let leaf_bytes = user_b.to_leaf_bytes();
        let merkle_proof = self.registry.prove_inclusion(&leaf_bytes)?;
        let balance_b = self.balances[uid_b as usize];

        log::debug!("tx {}: barcode-gen selected uid_b {}", hex::encode(tx_id), uid_b);
        Ok(TxBarcodeGenMsg {
            tx_id,
            uid_b,
            barcode: user_b.barcode,
            pk_b: user_b.pk,
            balance_b,
            leaf_bytes,
            merkle_proof,
        })
    }

    /// Step 5: verify the equality proof and apply the transfer.
    ///
    /// Peeks at the scratch entry before removing it: a step-5 message that
    /// arrives before `process_tx_barcode_gen` has run for this `tx_id`
    /// (`uid_b` still unset) must leave the still-live scratch in place so
    /// the legitimate step-5 can follow later, rather than cancelling an
    /// honest in-flight transaction out from under it.
    pub fn process_tx(&mut self, msg: TxMsg) -> Result<(), ServerError> {
        let uid_b = self
            .tx_scratch
            .get(&msg.tx_id)
            .ok_or(ServerError::UnknownTx(msg.tx_id))?
            .uid_b
            .ok_or(ServerError::ProtocolOrder)?;

        // Past this point the transaction has reached barcode-gen; any
        // failure from here on is fatal for this attempt, so the scratch
        // entry is removed either way.
        let scratch = self
            .tx_scratch
            .remove(&msg.tx_id)
            .expect("checked present above");
        if uid_b != msg.uid_b || scratch.sender_uid != Some(msg.sender_uid) {
            return Err(ServerError::UidMismatch);
        }

        let pk_s = self.user(msg.sender_uid)?.pk;
        let pk_b = self.user(uid_b)?.pk;

        if !verify_eq(&pk_s, &pk_b, &msg.delta_s, &msg.delta_b, &msg.proof) {
            log::warn!("tx {}: ZK-EQ verification failed", hex::encode(msg.tx_id));
            return Err(ServerError::InvalidProofEq);
        }

        self.balances[msg.sender_uid as usize] =
            add(&self.balances[msg.sender_uid as usize], &negate(&msg.delta_s));
        self.balances[uid_b as usize] = add(&self.balances[uid_b as usize], &msg.delta_b);
        log::debug!(
            "tx {}: applied uid {} -> uid {}",
            hex::encode(msg.tx_id),
            msg.sender_uid,
            uid_b
        );

        Ok(())
    }

    /// Settlement step 1: hand back the caller's current balance
    /// ciphertext.
    pub fn settle_balance_hello(&self, uid: u64) -> Result<SettleHelloResponseMsg, ServerError> {
        self.user(uid)?;
        Ok(SettleHelloResponseMsg {
            balance: self.balances[uid as usize],
        })
    }

    /// Settlement step 3: verify the client's decryption proof and, if it
    /// checks out, zero out the settled balance.
    pub fn settle_balance_finalize<R: RngCore + CryptoRng>(
        &mut self,
        msg: SettleFinalizeMsg,
        rng: &mut R,
    ) -> Result<(), ServerError> {
        let pk = self.user(msg.uid)?.pk;
        let ct = self.balances[msg.uid as usize];

        if !verify_dec(&pk, &ct, msg.balance_plaintext, &msg.proof) {
            log::warn!("uid {}: ZK-DEC verification failed at settlement", msg.uid);
            return Err(ServerError::InvalidProofDec);
        }

        self.balances[msg.uid as usize] = encrypt(&pk, 0, rng);
        log::debug!("uid {}: balance settled at {}", msg.uid, msg.balance_plaintext);
        Ok(())
    }

    /// Current balance ciphertext for `uid`, for tests and inspection.
    pub fn balance_of(&self, uid: u64) -> Result<loyalty_crypto::Ciphertext, ServerError> {
        self.user(uid)?;
        Ok(self.balances[uid as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loyalty_crypto::{decrypt, keygen};
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    fn rng_from(seed: u8) -> ChaCha20Rng {
        ChaCha20Rng::from_seed([seed; 32])
    }

    #[test]
    fn registration_assigns_sequential_uids_and_zero_balances() {
        let mut rng = rng_from(1);
        let mut server = Server::new(ProtocolConfig::default());
        let (sk0, pk0) = keygen(&mut rng);
        let record0 = server.register_user(100, pk0, &mut rng);
        assert_eq!(record0.uid, 0);
        let bal0 = server.balance_of(0).unwrap();
        assert_eq!(decrypt(&sk0, &bal0, server.config().m_max).unwrap(), 0);

        let (_, pk1) = keygen(&mut rng);
        let record1 = server.register_user(200, pk1, &mut rng);
        assert_eq!(record1.uid, 1);
        assert_eq!(server.user_count(), 2);
    }

    #[test]
    fn unknown_user_is_rejected() {
        let server = Server::new(ProtocolConfig::default());
        assert!(matches!(
            server.settle_balance_hello(0),
            Err(ServerError::UserNotFound(0))
        ));
    }

    #[test]
    fn hello_response_on_empty_registry_errors() {
        let mut rng = rng_from(2);
        let mut server = Server::new(ProtocolConfig::default());
        let msg = TxHelloMsg {
            sender_uid: 0,
            commit_ic: [1u8; 32],
        };
        assert!(matches!(
            server.process_tx_hello_response(msg, &mut rng),
            Err(ServerError::EmptyRegistry)
        ));
    }

    #[test]
    fn duplicate_tx_id_is_rejected() {
        let mut rng = rng_from(3);
        let mut server = Server::new(ProtocolConfig::default());
        let (_, pk) = keygen(&mut rng);
        server.register_user(100, pk, &mut rng);

        let msg = TxHelloMsg {
            sender_uid: 0,
            commit_ic: [7u8; 32],
        };
        server.process_tx_hello_response(msg, &mut rng).unwrap();
        let msg_again = TxHelloMsg {
            sender_uid: 0,
            commit_ic: [7u8; 32],
        };
        assert!(matches!(
            server.process_tx_hello_response(msg_again, &mut rng),
            Err(ServerError::DuplicateTx)
        ));
    }

    #[test]
    fn barcode_gen_before_hello_is_unknown_tx() {
        let mut server = Server::new(ProtocolConfig::default());
        let msg = TxComputeIdMsg {
            tx_id: [9u8; 32],
            i_c: 0,
            r_c: [0u8; 64],
        };
        assert!(matches!(
            server.process_tx_barcode_gen(msg),
            Err(ServerError::UnknownTx(id)) if id == [9u8; 32]
        ));
    }

    #[test]
    fn bad_commitment_opening_clears_scratch() {
        let mut rng = rng_from(5);
        let mut server = Server::new(ProtocolConfig::default());
        let (_, pk0) = keygen(&mut rng);
        server.register_user(100, pk0, &mut rng);
        let (_, pk1) = keygen(&mut rng);
        server.register_user(200, pk1, &mut rng);

        let r_c = [0u8; 64];
        let tx_id = loyalty_crypto::commitment::commit(0, &r_c);
        let hello = TxHelloMsg {
            sender_uid: 0,
            commit_ic: tx_id,
        };
        server.process_tx_hello_response(hello, &mut rng).unwrap();

        let bad = TxComputeIdMsg {
            tx_id,
            i_c: 1,
            r_c,
        };
        assert!(matches!(
            server.process_tx_barcode_gen(bad),
            Err(ServerError::BadCommitment)
        ));

        let retry = TxComputeIdMsg {
            tx_id,
            i_c: 0,
            r_c,
        };
        assert!(matches!(
            server.process_tx_barcode_gen(retry),
            Err(ServerError::UnknownTx(id)) if id == tx_id
        ));
    }

    #[test]
    fn premature_process_tx_does_not_cancel_the_live_scratch() {
        use loyalty_crypto::encrypt_with_witness;
        use loyalty_zk::prove_eq;

        let mut rng = rng_from(6);
        let mut server = Server::new(ProtocolConfig::default());
        let (_, pk0) = keygen(&mut rng);
        server.register_user(100, pk0, &mut rng);
        let (_, pk1) = keygen(&mut rng);
        server.register_user(200, pk1, &mut rng);

        let r_c = [0u8; 64];
        let tx_id = loyalty_crypto::commitment::commit(0, &r_c);
        let hello = TxHelloMsg {
            sender_uid: 0,
            commit_ic: tx_id,
        };
        // barcode-gen has not run yet: uid_b is still unset for this tx_id.
        server.process_tx_hello_response(hello, &mut rng).unwrap();

        let ws = encrypt_with_witness(&pk0, 5, &mut rng);
        let wb = encrypt_with_witness(&pk1, 5, &mut rng);
        let proof = prove_eq(&pk0, &pk1, 5, &ws, &wb, &mut rng);
        let premature = TxMsg {
            tx_id,
            sender_uid: 0,
            uid_b: 1,
            delta_s: ws.ciphertext,
            delta_b: wb.ciphertext,
            proof,
        };
        assert!(matches!(
            server.process_tx(premature),
            Err(ServerError::ProtocolOrder)
        ));

        // The scratch entry must still be live: a genuine barcode-gen for
        // this tx_id can still complete afterward.
        let compute_id = TxComputeIdMsg { tx_id, i_c: 0, r_c };
        assert!(server.process_tx_barcode_gen(compute_id).is_ok());
    }
}
