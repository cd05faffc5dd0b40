//! Per-transaction scratch state, shared in shape (if not in lifetime)
//! between the server and client state machines.
//!
//! Both sides accumulate the same facts about an in-flight transaction as
//! its 5 messages are exchanged; only who is allowed to see which field
//! differs (e.g. `i_c`/`r_c` exist here before the client has sent them).
//! Both sides key their live transactions by `tx_id` — the step-1
//! commitment — rather than by a participant's uid, so a client or server
//! can have several transactions in flight concurrently.

pub const COMMIT_LEN: usize = 32;
pub const MASK_LEN: usize = loyalty_crypto::commitment::MASK_LEN;

/// A transaction's 32-byte handle: equal to the shopper's step-1
/// commitment (`com`).
pub type TxId = [u8; COMMIT_LEN];

/// Coin-flip and routing state for one in-flight transaction.
#[derive(Clone, Debug, Default)]
pub struct TxScratch {
    pub sender_uid: Option<u64>,
    pub commit_ic: Option<[u8; COMMIT_LEN]>,
    pub i_c: Option<u64>,
    pub r_c: Option<[u8; MASK_LEN]>,
    pub i_s: Option<u64>,
    pub uid_b: Option<u64>,
}

impl TxScratch {
    pub fn new() -> Self {
        Self::default()
    }
}
