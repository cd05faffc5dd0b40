use thiserror::Error;

#[derive(Debug, Error)]
pub enum MerkleError {
    #[error("leaf not found in registry")]
    LeafNotFound,
}
