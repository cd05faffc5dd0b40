use thiserror::Error;

#[derive(Debug, Error)]
pub enum ZkError {
    #[error("ciphertext-equality proof does not verify")]
    InvalidProofEq,

    #[error("decryption-correctness proof does not verify")]
    InvalidProofDec,
}
