//! Server-side state machine for the loyalty-points protocol.
//!
//! The server holds the registry of users, their current (encrypted)
//! balances, and per-transaction scratch state. It never holds a client's
//! secret key and never decrypts a balance on its own — its only
//! decryption-adjacent role is *verifying* a client's decryption-proof at
//! settlement.

pub mod error;
pub mod server;

pub use error::ServerError;
pub use server::Server;
