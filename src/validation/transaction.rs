//! Transaction structure
//!
//! UTXO-based transactions in the legacy (non-witness) wire layout. Only the
//! parts the block core relies on live here: identity hash, coinbase
//! detection, inputs with their scripts and outputs with their values.

use crate::codec::{write_var_bytes, write_varint, CodecError, Decodable, Encodable, Reader};
use crate::constants::NULL_INDEX;
use crate::crypto::{double_hash, Hash};

use super::{Script, ScriptBuilder};

/// Smallest encodings: hash + index + empty script + sequence, value + empty script
const MIN_INPUT_SIZE: usize = 32 + 4 + 1 + 4;
const MIN_OUTPUT_SIZE: usize = 8 + 1;

/// Reference to an output of an earlier transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutPoint {
    /// Hash of the transaction containing the output
    pub hash: Hash,
    /// Index of the output in that transaction
    pub index: u32,
}

impl OutPoint {
    pub fn new(hash: Hash, index: u32) -> Self {
        Self { hash, index }
    }

    /// The prevout of a coinbase input
    pub fn null() -> Self {
        Self {
            hash: Hash::zero(),
            index: NULL_INDEX,
        }
    }

    pub fn is_null(&self) -> bool {
        self.hash.is_zero() && self.index == NULL_INDEX
    }
}

/// A transaction input referencing a previous output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxInput {
    pub prevout: OutPoint,
    /// Unlocking script; arbitrary data for a coinbase
    pub script: Script,
    pub sequence: u32,
}

/// A transaction output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    /// Amount in base units
    pub value: i64,
    /// Locking script
    pub script: Script,
}

/// A complete transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub version: i32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    /// Lock time (block height or timestamp)
    pub lock_time: u32,
}

impl Transaction {
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Self {
        Self {
            version: 1,
            inputs,
            outputs,
            lock_time: 0,
        }
    }

    /// Create a coinbase paying `value` to `script`, committing to `height`
    /// in its input script followed by `extra_nonce`.
    pub fn coinbase(height: i64, extra_nonce: &[u8], value: i64, script: Script) -> Self {
        let coinbase_script = ScriptBuilder::new()
            .push_script_num(height)
            .push_data(extra_nonce)
            .into_script();

        Self::new(
            vec![TxInput {
                prevout: OutPoint::null(),
                script: coinbase_script,
                sequence: 0xFFFF_FFFF,
            }],
            vec![TxOutput { value, script }],
        )
    }

    /// A coinbase has exactly one input, spending the null outpoint
    pub fn is_coinbase(&self) -> bool {
        matches!(self.inputs.as_slice(), [input] if input.prevout.is_null())
    }

    /// Transaction id: double SHA-256 of the wire encoding
    pub fn hash(&self) -> Hash {
        double_hash(&self.to_bytes())
    }

    /// Sum of all output values, saturating instead of overflowing
    pub fn total_output_value(&self) -> i64 {
        self.outputs
            .iter()
            .fold(0i64, |total, output| total.saturating_add(output.value))
    }
}

impl Encodable for Transaction {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.version.to_le_bytes());

        write_varint(out, self.inputs.len() as u64);
        for input in &self.inputs {
            out.extend_from_slice(&input.prevout.hash.0);
            out.extend_from_slice(&input.prevout.index.to_le_bytes());
            write_var_bytes(out, input.script.as_bytes());
            out.extend_from_slice(&input.sequence.to_le_bytes());
        }

        write_varint(out, self.outputs.len() as u64);
        for output in &self.outputs {
            out.extend_from_slice(&output.value.to_le_bytes());
            write_var_bytes(out, output.script.as_bytes());
        }

        out.extend_from_slice(&self.lock_time.to_le_bytes());
    }
}

impl Decodable for Transaction {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        let version = reader.read_i32()?;

        let input_count = reader.read_count(MIN_INPUT_SIZE)?;
        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            let hash = reader.read_hash()?;
            let index = reader.read_u32()?;
            let script = Script::new(reader.read_var_bytes()?);
            let sequence = reader.read_u32()?;
            inputs.push(TxInput {
                prevout: OutPoint { hash, index },
                script,
                sequence,
            });
        }

        let output_count = reader.read_count(MIN_OUTPUT_SIZE)?;
        let mut outputs = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            let value = reader.read_i64()?;
            let script = Script::new(reader.read_var_bytes()?);
            outputs.push(TxOutput { value, script });
        }

        let lock_time = reader.read_u32()?;

        Ok(Self {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }
}
