//! Block core library
//!
//! The block entity of a bitcoin-style full node: consensus checks over a
//! block, the subsidy schedule, and the three encodings a block travels in
//! (raw wire bytes, JSON, and the compact storage form).

pub mod codec;
pub mod config;
pub mod consensus;
pub mod crypto;
pub mod storage;
pub mod validation;

pub use config::{ChainParams, Config, Network};
pub use consensus::{Block, BlockHeader, BlockValidator, HeaderVerifier, ValidationError};
pub use validation::Transaction;

/// Protocol constants - HARD-CODED, NEVER CONFIGURABLE
pub mod constants {
    /// Base units per coin (8 decimal places)
    pub const COIN: i64 = 100_000_000;

    /// Reward of the first block of the chain, before any halving
    pub const INITIAL_SUBSIDY: i64 = 50 * COIN;

    /// Blocks between two halvings of the subsidy
    pub const HALVING_INTERVAL: i32 = 210_000;

    /// Once this many halvings happened the shifted subsidy is always zero
    pub const MAX_HALVINGS: i32 = 64;

    /// Upper bound for both the serialized size and the transaction count
    pub const MAX_BLOCK_SIZE: usize = 1_000_000;

    /// How far in the future a header timestamp may lie (seconds)
    pub const MAX_FUTURE_BLOCK_TIME: u32 = 2 * 60 * 60;

    /// Height sentinel for a block not yet placed in the chain
    pub const UNKNOWN_HEIGHT: i32 = -1;

    /// Relay tag for blocks that did not come from a peer
    pub const DEFAULT_RELAYED_BY: &str = "0.0.0.0";

    /// Type tag carried by the JSON and compact encodings
    pub const BLOCK_TYPE: &str = "block";

    /// Prevout index marking a coinbase input
    pub const NULL_INDEX: u32 = 0xFFFF_FFFF;
}
