//! Shared data model and wire messages for the loyalty-points protocol.
//!
//! This crate has no behavior of its own: it is the vocabulary that
//! `loyalty-server` and `loyalty-client` both speak. Keeping it separate
//! means the two state machines can't accidentally drift on message or
//! record layout.

pub mod config;
pub mod error;
pub mod scratch;
pub mod user;
pub mod wire;

pub use config::ProtocolConfig;
pub use error::TypesError;
pub use scratch::{TxId, TxScratch};
pub use user::{MerkleLeaf, UserRecord};
pub use wire::{
    SettleFinalizeMsg, SettleHelloMsg, SettleHelloResponseMsg, TxBarcodeGenMsg, TxComputeIdMsg,
    TxHelloMsg, TxHelloResponseMsg, TxMsg,
};
