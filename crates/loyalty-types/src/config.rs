//! Protocol-wide configuration.
//!
//! None of this is negotiated on the wire; both server and client are
//! expected to be configured with the same values out of band, since
//! transport and session setup are out of scope here.

/// Default brute-force decryption window: balances are assumed to stay
/// within `+/- m_max` points.
pub const DEFAULT_M_MAX: u32 = 100_000;

/// The only legal encoding for a commitment's integer half. Kept as a
/// named, single-variant enum (in the style of an enum-shaped hard-fork
/// constant) rather than a runtime choice, since
/// `loyalty_crypto::commitment` only ever produces 8-byte little-endian.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum CommitmentEncoding {
    #[default]
    U64Le,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProtocolConfig {
    /// Brute-force discrete-log window used by [`loyalty_crypto::decrypt`].
    pub m_max: u32,
    pub commitment_int_encoding: CommitmentEncoding,
    /// Always `true`: the point-free transfer variant is out of scope.
    pub handle_points: bool,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            m_max: DEFAULT_M_MAX,
            commitment_int_encoding: CommitmentEncoding::U64Le,
            handle_points: true,
        }
    }
}
