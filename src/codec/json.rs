//! JSON encoding of blocks and transactions
//!
//! Field names follow the node's RPC conventions. Hashes are shown in
//! display (byte-reversed) order; scripts are hex.

use serde::{Deserialize, Serialize};

use super::CodecError;
use crate::config::Network;
use crate::constants::BLOCK_TYPE;
use crate::consensus::{Block, BlockHeader};
use crate::crypto::Hash;
use crate::validation::{OutPoint, Script, Transaction, TxInput, TxOutput};

const TX_TYPE: &str = "tx";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutPointJson {
    pub hash: String,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputJson {
    pub prevout: OutPointJson,
    pub script: String,
    pub sequence: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputJson {
    pub value: i64,
    pub script: String,
}

/// JSON form of a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxJson {
    #[serde(rename = "type")]
    pub kind: String,
    /// Transaction id in display order; informational only
    pub hash: String,
    pub version: i32,
    pub inputs: Vec<InputJson>,
    pub outputs: Vec<OutputJson>,
    pub locktime: u32,
}

/// JSON form of a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockJson {
    #[serde(rename = "type")]
    pub kind: String,
    pub subtype: String,
    pub height: i32,
    pub relayed_by: String,
    #[serde(default)]
    pub network: Network,
    /// Block hash in display order; informational only
    pub hash: String,
    pub version: i32,
    pub prev_block: String,
    pub merkle_root: String,
    pub ts: u32,
    pub bits: u32,
    pub nonce: u32,
    #[serde(rename = "totalTX")]
    pub total_tx: usize,
    pub txs: Vec<TxJson>,
}

pub(crate) fn expect_type(expected: &str, found: &str) -> Result<(), CodecError> {
    if found != expected {
        return Err(CodecError::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }
    Ok(())
}

impl Transaction {
    pub fn to_json(&self) -> TxJson {
        TxJson {
            kind: TX_TYPE.to_string(),
            hash: self.hash().to_rhex(),
            version: self.version,
            inputs: self
                .inputs
                .iter()
                .map(|input| InputJson {
                    prevout: OutPointJson {
                        hash: input.prevout.hash.to_rhex(),
                        index: input.prevout.index,
                    },
                    script: input.script.to_hex(),
                    sequence: input.sequence,
                })
                .collect(),
            outputs: self
                .outputs
                .iter()
                .map(|output| OutputJson {
                    value: output.value,
                    script: output.script.to_hex(),
                })
                .collect(),
            locktime: self.lock_time,
        }
    }

    pub fn from_json(json: &TxJson) -> Result<Self, CodecError> {
        expect_type(TX_TYPE, &json.kind)?;

        let inputs = json
            .inputs
            .iter()
            .map(|input| -> Result<TxInput, CodecError> {
                Ok(TxInput {
                    prevout: OutPoint::new(
                        Hash::from_rhex(&input.prevout.hash)?,
                        input.prevout.index,
                    ),
                    script: Script::from_hex(&input.script)?,
                    sequence: input.sequence,
                })
            })
            .collect::<Result<Vec<_>, CodecError>>()?;

        let outputs = json
            .outputs
            .iter()
            .map(|output| -> Result<TxOutput, CodecError> {
                Ok(TxOutput {
                    value: output.value,
                    script: Script::from_hex(&output.script)?,
                })
            })
            .collect::<Result<Vec<_>, CodecError>>()?;

        Ok(Self {
            version: json.version,
            inputs,
            outputs,
            lock_time: json.locktime,
        })
    }
}

impl Block {
    pub fn to_json(&self) -> BlockJson {
        BlockJson {
            kind: BLOCK_TYPE.to_string(),
            subtype: BLOCK_TYPE.to_string(),
            height: self.height(),
            relayed_by: self.relayed_by().to_string(),
            network: self.network(),
            hash: self.rhash(),
            version: self.version(),
            prev_block: self.prev_block().to_rhex(),
            merkle_root: self.merkle_root().to_rhex(),
            ts: self.ts(),
            bits: self.bits(),
            nonce: self.nonce(),
            total_tx: self.total_tx(),
            txs: self.txs().iter().map(Transaction::to_json).collect(),
        }
    }

    /// Rebuild a block from its JSON form; the hash is recomputed, not trusted
    pub fn from_json(json: &BlockJson) -> Result<Self, CodecError> {
        expect_type(BLOCK_TYPE, &json.kind)?;
        expect_type(BLOCK_TYPE, &json.subtype)?;

        let header = BlockHeader::new(
            json.version,
            Hash::from_rhex(&json.prev_block)?,
            Hash::from_rhex(&json.merkle_root)?,
            json.ts,
            json.bits,
            json.nonce,
        );

        let txs = json
            .txs
            .iter()
            .map(Transaction::from_json)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Block::new(header, txs)
            .with_height(json.height)
            .with_relayed_by(json.relayed_by.as_str())
            .with_network(json.network))
    }

    pub fn to_json_string(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(&self.to_json())?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, CodecError> {
        let json: BlockJson = serde_json::from_str(text)?;
        Self::from_json(&json)
    }
}
