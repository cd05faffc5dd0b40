use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("client is not yet registered with the server")]
    NotRegistered,

    #[error("local registry view is empty; call update_state first")]
    EmptyRegistry,

    #[error("no transaction in flight for tx_id {}", hex::encode(.0))]
    UnknownTx([u8; 32]),

    #[error("operation invalid for this tx_id's current stage: expected {expected}, got {actual}")]
    ProtocolOrder {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("points amount {0} exceeds the configured +/-m_max window")]
    PointsOutOfRange(i64),

    #[error("barcode-gen recipient uid does not match the one this client computed")]
    UidMismatch,

    #[error("server's inclusion proof does not verify against the locally known root")]
    InvalidProofMerkle,

    #[error("server-supplied leaf contents do not match the claimed recipient")]
    LeafMismatch,

    #[error(transparent)]
    Crypto(#[from] loyalty_crypto::CryptoError),

    #[error(transparent)]
    Types(#[from] loyalty_types::TypesError),

    #[error(transparent)]
    Server(#[from] loyalty_server::ServerError),
}
