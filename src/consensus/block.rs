//! Block structure
//!
//! A block owns its header facts and transactions. Values derived from them
//! (wire bytes, block and transaction hashes, coinbase height, reward
//! breakdown) are computed on first
//! use and memoized, one independent cell each, so a block can be shared
//! across threads for reading. Fields that feed the wire encoding are never
//! mutated after construction; chain metadata (height, network) is replaced
//! through `with_*` methods that reset the caches depending on it.

use std::sync::OnceLock;

use serde::Serialize;
use thiserror::Error;

use crate::codec::encode_block;
use crate::config::Network;
use crate::constants::{DEFAULT_RELAYED_BY, UNKNOWN_HEIGHT};
use crate::consensus::{block_subsidy, format_amount, BlockHeader, RewardSummary};
use crate::crypto::{compute_merkle_root, Hash};
use crate::validation::{read_script_num, ScriptElement, ScriptNumError, Transaction};

/// Largest script number accepted as a coinbase height
const MAX_HEIGHT_NUM_SIZE: usize = 4;

/// Why a block carries no usable coinbase height
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Bip34Error {
    #[error("Block version does not commit to a height")]
    Unsupported,
    #[error("No height push in the coinbase script")]
    NotPresent,
    #[error("Malformed coinbase height: {0}")]
    Malformed(#[from] ScriptNumError),
}

/// A complete block containing header facts and transactions
#[derive(Debug, Clone)]
pub struct Block {
    header: BlockHeader,
    txs: Vec<Transaction>,
    height: i32,
    relayed_by: String,
    network: Network,
    raw: OnceLock<Vec<u8>>,
    hash: OnceLock<Hash>,
    tx_hashes: OnceLock<Vec<Hash>>,
    coinbase_height: OnceLock<i64>,
    reward: OnceLock<RewardSummary>,
}

/// Human-oriented view of a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSummary {
    pub hash: String,
    pub height: i32,
    pub relayed_by: String,
    pub version: i32,
    pub prev_block: String,
    pub merkle_root: String,
    pub ts: u32,
    pub date: Option<String>,
    pub bits: u32,
    pub nonce: u32,
    pub total_tx: usize,
    pub size: usize,
    pub reward: String,
    pub fee: String,
}

impl Block {
    /// Create a block of unknown height from typed transactions
    pub fn new(header: BlockHeader, txs: Vec<Transaction>) -> Self {
        Self {
            header,
            txs,
            height: UNKNOWN_HEIGHT,
            relayed_by: DEFAULT_RELAYED_BY.to_string(),
            network: Network::default(),
            raw: OnceLock::new(),
            hash: OnceLock::new(),
            tx_hashes: OnceLock::new(),
            coinbase_height: OnceLock::new(),
            reward: OnceLock::new(),
        }
    }

    /// Create a block from decoded wire data, keeping the bytes it came from
    pub(crate) fn from_decoded(header: BlockHeader, txs: Vec<Transaction>, raw: Vec<u8>) -> Self {
        let block = Self::new(header, txs);
        let _ = block.raw.set(raw);
        block
    }

    /// Place the block in the chain; `-1` means unknown
    pub fn with_height(mut self, height: i32) -> Self {
        self.height = height;
        self.reward = OnceLock::new();
        self
    }

    pub fn with_relayed_by(mut self, relayed_by: impl Into<String>) -> Self {
        self.relayed_by = relayed_by.into();
        self
    }

    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self.reward = OnceLock::new();
        self
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn txs(&self) -> &[Transaction] {
        &self.txs
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn relayed_by(&self) -> &str {
        &self.relayed_by
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn version(&self) -> i32 {
        self.header.version
    }

    pub fn prev_block(&self) -> &Hash {
        &self.header.prev_block
    }

    /// Merkle root as claimed by the header
    pub fn merkle_root(&self) -> &Hash {
        &self.header.merkle_root
    }

    pub fn ts(&self) -> u32 {
        self.header.ts
    }

    pub fn bits(&self) -> u32 {
        self.header.bits
    }

    pub fn nonce(&self) -> u32 {
        self.header.nonce
    }

    pub fn total_tx(&self) -> usize {
        self.txs.len()
    }

    /// Wire encoding; produced once and reused afterwards
    pub fn render(&self) -> &[u8] {
        self.raw.get_or_init(|| encode_block(&self.header, &self.txs))
    }

    /// Serialized size in bytes
    pub fn size(&self) -> usize {
        self.render().len()
    }

    /// Block hash in internal byte order
    pub fn hash(&self) -> Hash {
        *self.hash.get_or_init(|| self.header.hash())
    }

    /// Block hash in display order
    pub fn rhash(&self) -> String {
        self.hash().to_rhex()
    }

    /// Transaction ids in block order
    pub fn tx_hashes(&self) -> &[Hash] {
        self.tx_hashes
            .get_or_init(|| self.txs.iter().map(Transaction::hash).collect())
    }

    /// Merkle root recomputed from the transactions
    pub fn compute_merkle_root(&self) -> Hash {
        compute_merkle_root(self.tx_hashes())
    }

    /// The first transaction, if it is a coinbase
    pub fn coinbase(&self) -> Option<&Transaction> {
        self.txs.first().filter(|tx| tx.is_coinbase())
    }

    pub fn is_genesis(&self) -> bool {
        self.header.prev_block.is_zero()
    }

    /// Height committed to by the coinbase of a version 2+ block
    ///
    /// The first element of the first input script of the first transaction
    /// must be a data push holding a minimally encoded script number.
    pub fn bip34_height(&self) -> Result<i64, Bip34Error> {
        if self.header.version < 2 {
            return Err(Bip34Error::Unsupported);
        }

        let input = self
            .txs
            .first()
            .and_then(|tx| tx.inputs.first())
            .ok_or(Bip34Error::NotPresent)?;

        match input.script.first_element() {
            Some(Ok(ScriptElement::Data(bytes))) => {
                Ok(read_script_num(bytes, true, MAX_HEIGHT_NUM_SIZE)?)
            }
            _ => Err(Bip34Error::NotPresent),
        }
    }

    /// Coinbase height, or `-1` when the block carries none
    pub fn coinbase_height(&self) -> i64 {
        if self.header.version < 2 {
            return -1;
        }
        *self
            .coinbase_height
            .get_or_init(|| self.bip34_height().unwrap_or(-1))
    }

    /// Subsidy, coinbase payout and fee of this block
    ///
    /// With an unknown height nothing is known about fees: the fee is zero and
    /// the reward equals the base subsidy.
    pub fn reward_summary(&self) -> RewardSummary {
        *self.reward.get_or_init(|| {
            let base = block_subsidy(self.height, self.network.params());

            if self.height == UNKNOWN_HEIGHT {
                return RewardSummary {
                    base,
                    reward: base,
                    fee: 0,
                };
            }

            let reward = self
                .txs
                .first()
                .map(Transaction::total_output_value)
                .unwrap_or(0);

            RewardSummary {
                base,
                reward,
                fee: reward.saturating_sub(base),
            }
        })
    }

    pub fn base_reward(&self) -> i64 {
        self.reward_summary().base
    }

    pub fn reward(&self) -> i64 {
        self.reward_summary().reward
    }

    pub fn fee(&self) -> i64 {
        self.reward_summary().fee
    }

    pub fn inspect(&self) -> BlockSummary {
        let date = chrono::DateTime::from_timestamp(self.header.ts as i64, 0)
            .map(|d| d.to_rfc3339_opts(chrono::SecondsFormat::Millis, true));

        BlockSummary {
            hash: self.rhash(),
            height: self.height,
            relayed_by: self.relayed_by.clone(),
            version: self.header.version,
            prev_block: self.header.prev_block.to_rhex(),
            merkle_root: self.header.merkle_root.to_rhex(),
            ts: self.header.ts,
            date,
            bits: self.header.bits,
            nonce: self.header.nonce,
            total_tx: self.txs.len(),
            size: self.size(),
            reward: format_amount(self.reward()),
            fee: format_amount(self.fee()),
        }
    }
}
