//! Block validation
//!
//! Context-free consensus checks over a single block. Each check is a hard
//! gate: the first failure rejects the block and names the reason.

use std::collections::HashSet;

use thiserror::Error;

use crate::config::{ChainParams, Network};
use crate::consensus::{Block, HeaderVerifier, ProofOfWork};
use crate::crypto::{compute_merkle_root, Hash};

/// Validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Block failed header checks")]
    BadHeader,
    #[error("Block is too large: {tx_count} transactions, {size} bytes (max {max})")]
    TooLarge {
        tx_count: usize,
        size: usize,
        max: usize,
    },
    #[error("Block has no coinbase")]
    NoCoinbase,
    #[error("Block has more than one coinbase (transaction {index})")]
    MultipleCoinbase { index: usize },
    #[error("Block has duplicate txids: {0}")]
    DuplicateTxid(Hash),
    #[error("Block failed merkle root test: claimed {claimed}, computed {computed}")]
    MerkleRootMismatch { claimed: Hash, computed: Hash },
}

/// Structural validator for blocks of one network
#[derive(Debug, Clone)]
pub struct BlockValidator<V> {
    params: ChainParams,
    headers: V,
}

impl BlockValidator<ProofOfWork> {
    /// Validator using the network's proof-of-work rules
    pub fn for_network(network: Network) -> Self {
        let params = network.params();
        Self::new(params, ProofOfWork::new(params))
    }
}

impl<V: HeaderVerifier> BlockValidator<V> {
    pub fn new(params: &ChainParams, headers: V) -> Self {
        Self {
            params: params.clone(),
            headers,
        }
    }

    pub fn params(&self) -> &ChainParams {
        &self.params
    }

    /// Run every check in order, logging the reason of a rejection
    pub fn verify(&self, block: &Block) -> Result<(), ValidationError> {
        let result = self.check(block);
        if let Err(reason) = &result {
            tracing::debug!(block = %block.rhash(), %reason, "block rejected");
        }
        result
    }

    pub fn is_valid(&self, block: &Block) -> bool {
        self.verify(block).is_ok()
    }

    fn check(&self, block: &Block) -> Result<(), ValidationError> {
        if !self.headers.verify_headers(block.header()) {
            return Err(ValidationError::BadHeader);
        }

        // Size can't be bigger than the maximum block size
        let max = self.params.max_block_size;
        let tx_count = block.txs().len();
        let size = block.size();
        if tx_count > max || size > max {
            return Err(ValidationError::TooLarge { tx_count, size, max });
        }

        // First transaction must be a coinbase
        let first = block.txs().first().ok_or(ValidationError::NoCoinbase)?;
        if !first.is_coinbase() {
            return Err(ValidationError::NoCoinbase);
        }

        // One pass in block order: a later coinbase or a repeated txid,
        // whichever comes first
        let hashes = block.tx_hashes();
        let mut seen = HashSet::with_capacity(hashes.len());
        for (index, (tx, hash)) in block.txs().iter().zip(hashes).enumerate() {
            if index > 0 && tx.is_coinbase() {
                return Err(ValidationError::MultipleCoinbase { index });
            }
            if !seen.insert(hash) {
                return Err(ValidationError::DuplicateTxid(*hash));
            }
        }

        let computed = compute_merkle_root(hashes);
        let claimed = *block.merkle_root();
        if computed != claimed {
            return Err(ValidationError::MerkleRootMismatch { claimed, computed });
        }

        Ok(())
    }
}
