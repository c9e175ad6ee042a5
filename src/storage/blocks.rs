//! Block persistence
//!
//! Blocks are written in their compact form under `b/<hash hex>`, with the
//! hash in internal byte order.

use super::{Database, StorageError, WriteBatch};
use crate::consensus::Block;
use crate::crypto::Hash;

const BLOCK_PREFIX: &[u8] = b"b/";

fn block_key(hash: &Hash) -> Vec<u8> {
    let mut key = Vec::with_capacity(BLOCK_PREFIX.len() + 64);
    key.extend_from_slice(BLOCK_PREFIX);
    key.extend_from_slice(hash.to_hex().as_bytes());
    key
}

/// Blocks keyed by hash
#[derive(Debug, Clone)]
pub struct BlockStore {
    db: Database,
}

impl BlockStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Save a block
    pub fn put_block(&self, block: &Block) -> Result<(), StorageError> {
        self.db.put(&block_key(&block.hash()), &block.to_compact_bytes()?)?;
        tracing::trace!(block = %block.rhash(), height = block.height(), "block stored");
        Ok(())
    }

    /// Save several blocks atomically
    pub fn put_blocks(&self, blocks: &[Block]) -> Result<(), StorageError> {
        let mut batch = WriteBatch::new();
        for block in blocks {
            batch.put(&block_key(&block.hash()), &block.to_compact_bytes()?);
        }
        self.db.batch(batch)
    }

    /// Get a block by hash
    pub fn get_block(&self, hash: &Hash) -> Result<Option<Block>, StorageError> {
        match self.db.get(&block_key(hash))? {
            Some(bytes) => Ok(Some(Block::from_compact_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn has_block(&self, hash: &Hash) -> Result<bool, StorageError> {
        self.db.contains(&block_key(hash))
    }

    pub fn remove_block(&self, hash: &Hash) -> Result<bool, StorageError> {
        self.db.del(&block_key(hash))
    }

    /// Every stored block, ordered by hash
    pub fn blocks(&self) -> impl Iterator<Item = Result<Block, StorageError>> {
        self.db.iter(BLOCK_PREFIX).map(|item| -> Result<Block, StorageError> {
            let (_, value) = item?;
            Ok(Block::from_compact_bytes(&value)?)
        })
    }
}
