//! Block header
//!
//! The 80-byte header carries the proof of work and commits to the
//! transactions through the merkle root.

use crate::codec::{CodecError, Decodable, Encodable, Reader};
use crate::crypto::{double_hash, Hash};

/// Block header containing all metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHeader {
    /// Protocol version; 2 and above commit to the height in the coinbase
    pub version: i32,
    /// Hash of the previous block
    pub prev_block: Hash,
    /// Merkle root of all transactions, as claimed by the miner
    pub merkle_root: Hash,
    /// Block timestamp (seconds since Unix epoch)
    pub ts: u32,
    /// Difficulty target (compact representation)
    pub bits: u32,
    /// Nonce used for PoW
    pub nonce: u32,
}

impl BlockHeader {
    /// Serialized header size
    pub const SIZE: usize = 80;

    pub fn new(
        version: i32,
        prev_block: Hash,
        merkle_root: Hash,
        ts: u32,
        bits: u32,
        nonce: u32,
    ) -> Self {
        Self {
            version,
            prev_block,
            merkle_root,
            ts,
            bits,
            nonce,
        }
    }

    /// Block hash: double SHA-256 of the 80 header bytes
    pub fn hash(&self) -> Hash {
        double_hash(&self.to_bytes())
    }
}

impl Encodable for BlockHeader {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.prev_block.0);
        out.extend_from_slice(&self.merkle_root.0);
        out.extend_from_slice(&self.ts.to_le_bytes());
        out.extend_from_slice(&self.bits.to_le_bytes());
        out.extend_from_slice(&self.nonce.to_le_bytes());
    }
}

impl Decodable for BlockHeader {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            version: reader.read_i32()?,
            prev_block: reader.read_hash()?,
            merkle_root: reader.read_hash()?,
            ts: reader.read_u32()?,
            bits: reader.read_u32()?,
            nonce: reader.read_u32()?,
        })
    }
}
