use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("uid {0} is not registered")]
    UserNotFound(u64),

    #[error("no transaction in flight for tx_id {}", hex::encode(.0))]
    UnknownTx([u8; 32]),

    #[error("a transaction is already in flight for this tx_id")]
    DuplicateTx,

    #[error("registry has no registered users yet")]
    EmptyRegistry,

    #[error("commitment does not open to the claimed index")]
    BadCommitment,

    #[error("recipient uid in final message does not match the one generated at barcode-gen")]
    UidMismatch,

    #[error("message received out of order for this transaction's current stage")]
    ProtocolOrder,

    #[error("ciphertext-equality proof does not verify")]
    InvalidProofEq,

    #[error("decryption-correctness proof does not verify")]
    InvalidProofDec,

    #[error(transparent)]
    Crypto(#[from] loyalty_crypto::CryptoError),

    #[error(transparent)]
    Merkle(#[from] loyalty_merkle::MerkleError),
}
