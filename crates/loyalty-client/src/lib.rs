//! Client-side state machine for the loyalty-points protocol.
//!
//! A `Client` owns one barcode, one ElGamal keypair, and a local snapshot
//! of the server's public registry. `register_with_server` and
//! `settle_balance` call straight into a [`loyalty_server::Server`]
//! (transport and session handling are out of scope, so there is nothing
//! to gain from pretending the two sides aren't in the same process). The
//! 5-message transaction handshake, by contrast, is decomposed into one
//! function per message so its state transitions are independently
//! observable and testable.

pub mod client;
pub mod error;

pub use client::{Client, TxState};
pub use error::ClientError;
