//! Crypto-layer error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid key: point does not decompress to a valid group element")]
    InvalidKey,

    #[error("invalid ciphertext: point does not decompress to a valid group element")]
    InvalidCiphertext,

    #[error("balance out of range: plaintext not found within +/-{0}")]
    BalanceOutOfRange(u64),
}
