//! Raw wire encoding of blocks
//!
//! Layout: 80-byte header, CompactSize transaction count, then every
//! transaction's own encoding, concatenated without padding.

use super::{write_varint, CodecError, Decodable, Encodable, Reader};
use crate::consensus::{Block, BlockHeader};
use crate::validation::Transaction;

/// Version + input count + output count + lock time
const MIN_TX_SIZE: usize = 4 + 1 + 1 + 4;

/// Frame a header and transactions as wire bytes
pub fn encode_block(header: &BlockHeader, txs: &[Transaction]) -> Vec<u8> {
    let mut out = Vec::with_capacity(BlockHeader::SIZE + 1 + txs.len() * 256);
    header.encode(&mut out);
    write_varint(&mut out, txs.len() as u64);
    for tx in txs {
        tx.encode(&mut out);
    }
    out
}

/// Parse wire bytes; the whole buffer must be consumed
pub fn decode_block(bytes: &[u8]) -> Result<(BlockHeader, Vec<Transaction>), CodecError> {
    let mut reader = Reader::new(bytes);
    let header = BlockHeader::decode(&mut reader)?;

    let count = reader.read_count(MIN_TX_SIZE)?;
    let mut txs = Vec::with_capacity(count);
    for _ in 0..count {
        txs.push(Transaction::decode(&mut reader)?);
    }

    reader.finish()?;
    Ok((header, txs))
}

impl Block {
    /// Decode a block from wire bytes, keeping them as its raw encoding
    pub fn from_raw(bytes: &[u8]) -> Result<Self, CodecError> {
        let (header, txs) = decode_block(bytes)?;
        Ok(Block::from_decoded(header, txs, bytes.to_vec()))
    }

    pub fn from_raw_hex(hex: &str) -> Result<Self, CodecError> {
        let bytes = hex::decode(hex.trim())?;
        Self::from_raw(&bytes)
    }

    pub fn to_raw(&self) -> Vec<u8> {
        self.render().to_vec()
    }

    pub fn to_raw_hex(&self) -> String {
        hex::encode(self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{compute_merkle_root, Hash};
    use crate::validation::Script;

    fn sample_block() -> Block {
        let txs = vec![
            Transaction::coinbase(7, b"nonce", 50, Script::new(vec![0xac])),
            Transaction::coinbase(8, b"other", 10, Script::default()),
        ];
        let hashes: Vec<Hash> = txs.iter().map(Transaction::hash).collect();
        let header = BlockHeader::new(2, Hash::zero(), compute_merkle_root(&hashes), 5, 0x207fffff, 9);
        Block::new(header, txs)
    }

    #[test]
    fn test_raw_roundtrip() {
        let block = sample_block();
        let raw = block.to_raw();
        let decoded = Block::from_raw(&raw).unwrap();
        assert_eq!(decoded.header(), block.header());
        assert_eq!(decoded.txs(), block.txs());
        assert_eq!(decoded.render(), &raw[..]);
        assert_eq!(decoded.hash(), block.hash());
    }

    #[test]
    fn test_raw_hex_roundtrip() {
        let block = sample_block();
        let decoded = Block::from_raw_hex(&block.to_raw_hex()).unwrap();
        assert_eq!(decoded.to_raw(), block.to_raw());
    }

    #[test]
    fn test_truncated_block_fails() {
        let raw = sample_block().to_raw();
        assert!(Block::from_raw(&raw[..50]).unwrap_err().is_truncation());
        assert!(Block::from_raw(&raw[..raw.len() - 1]).is_err());
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut raw = sample_block().to_raw();
        raw.push(0);
        assert!(matches!(
            Block::from_raw(&raw),
            Err(CodecError::TrailingBytes(1))
        ));
    }

    #[test]
    fn test_bad_hex_rejected() {
        assert!(matches!(Block::from_raw_hex("zz"), Err(CodecError::Hex(_))));
    }
}
