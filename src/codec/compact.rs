//! Compact storage form of blocks
//!
//! Embeds the complete wire encoding as hex next to the chain metadata the
//! wire format does not carry (height, relay origin, network). Decoding
//! re-parses the embedded bytes with the raw decoder.

use serde::{Deserialize, Serialize};

use super::json::expect_type;
use super::CodecError;
use crate::config::Network;
use crate::constants::BLOCK_TYPE;
use crate::consensus::Block;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactBlock {
    #[serde(rename = "type")]
    pub kind: String,
    pub subtype: String,
    /// Block hash in internal byte order
    pub hash: String,
    /// Previous block hash in internal byte order
    pub prev_block: String,
    pub ts: u32,
    pub height: i32,
    pub relayed_by: String,
    #[serde(default)]
    pub network: Network,
    /// Raw wire bytes as hex
    pub block: String,
}

impl Block {
    pub fn to_compact(&self) -> CompactBlock {
        CompactBlock {
            kind: BLOCK_TYPE.to_string(),
            subtype: BLOCK_TYPE.to_string(),
            hash: self.hash().to_hex(),
            prev_block: self.prev_block().to_hex(),
            ts: self.ts(),
            height: self.height(),
            relayed_by: self.relayed_by().to_string(),
            network: self.network(),
            block: self.to_raw_hex(),
        }
    }

    pub fn from_compact(compact: &CompactBlock) -> Result<Self, CodecError> {
        expect_type(BLOCK_TYPE, &compact.kind)?;

        let raw = hex::decode(&compact.block)?;
        Ok(Block::from_raw(&raw)?
            .with_height(compact.height)
            .with_relayed_by(compact.relayed_by.as_str())
            .with_network(compact.network))
    }

    /// Compact form serialized as JSON bytes, the value stored on disk
    pub fn to_compact_bytes(&self) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(&self.to_compact())?)
    }

    pub fn from_compact_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let compact: CompactBlock = serde_json::from_slice(bytes)?;
        Self::from_compact(&compact)
    }
}
