use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("wire message truncated or malformed: {0}")]
    Malformed(&'static str),
}
