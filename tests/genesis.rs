//! Known-answer tests against the bitcoin main-net genesis block

use block_core::consensus::{Bip34Error, BlockValidator, HeaderVerifier, ProofOfWork};
use block_core::constants::COIN;
use block_core::validation::ScriptElement;
use block_core::{Block, Network};

const GENESIS_HEX: &str = "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a29ab5f49ffff001d1dac2b7c0101000000010000000000000000000000000000000000000000000000000000000000000000ffffffff4d04ffff001d0104455468652054696d65732030332f4a616e2f32303039204368616e63656c6c6f72206f6e206272696e6b206f66207365636f6e64206261696c6f757420666f722062616e6b73ffffffff0100f2052a01000000434104678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5fac00000000";

const GENESIS_HASH: &str = "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f";
const GENESIS_MERKLE_ROOT: &str = "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b";

fn genesis() -> Block {
    Block::from_raw_hex(GENESIS_HEX).unwrap()
}

#[test]
fn test_genesis_decodes() {
    let block = genesis();
    assert_eq!(block.size(), 285);
    assert_eq!(block.version(), 1);
    assert_eq!(block.ts(), 1231006505);
    assert_eq!(block.bits(), 0x1d00ffff);
    assert_eq!(block.nonce(), 2083236893);
    assert_eq!(block.total_tx(), 1);
    assert!(block.is_genesis());
    assert!(block.txs()[0].is_coinbase());
    assert_eq!(block.txs()[0].outputs[0].value, 50 * COIN);
}

#[test]
fn test_genesis_hash_and_merkle_root() {
    let block = genesis();
    assert_eq!(block.rhash(), GENESIS_HASH);
    assert_eq!(block.merkle_root().to_rhex(), GENESIS_MERKLE_ROOT);
    assert_eq!(block.compute_merkle_root(), *block.merkle_root());
    // A single transaction is its own merkle root
    assert_eq!(block.txs()[0].hash(), *block.merkle_root());
}

#[test]
fn test_genesis_reencodes_byte_exact() {
    let block = genesis();
    let rebuilt = Block::new(*block.header(), block.txs().to_vec());
    assert_eq!(rebuilt.to_raw_hex(), GENESIS_HEX);
}

#[test]
fn test_genesis_passes_proof_of_work() {
    let block = genesis();
    let pow = ProofOfWork::new(Network::Main.params());
    assert!(pow.verify_headers(block.header()));
}

#[test]
fn test_genesis_is_valid() {
    let validator = BlockValidator::for_network(Network::Main);
    assert_eq!(validator.verify(&genesis()), Ok(()));
}

#[test]
fn test_genesis_has_no_coinbase_height() {
    let block = genesis();
    assert_eq!(block.coinbase_height(), -1);
    assert_eq!(block.bip34_height(), Err(Bip34Error::Unsupported));

    // The first push of the genesis coinbase is the difficulty bits
    let script = &block.txs()[0].inputs[0].script;
    assert_eq!(
        script.first_element(),
        Some(Ok(ScriptElement::Data(&[0xff, 0xff, 0x00, 0x1d])))
    );
}

#[test]
fn test_genesis_reward() {
    let unknown = genesis();
    assert_eq!(unknown.fee(), 0);

    let block = genesis().with_height(0);
    assert_eq!(block.base_reward(), 50 * COIN);
    assert_eq!(block.reward(), 50 * COIN);
    assert_eq!(block.fee(), 0);

    let summary = block.inspect();
    assert_eq!(summary.reward, "50.0");
    assert_eq!(summary.fee, "0.0");
    assert_eq!(summary.date.as_deref(), Some("2009-01-03T18:15:05.000Z"));
}

#[test]
fn test_genesis_json_and_compact() {
    let block = genesis().with_height(0);

    let json = block.to_json();
    assert_eq!(json.hash, GENESIS_HASH);
    assert_eq!(json.merkle_root, GENESIS_MERKLE_ROOT);
    let from_json = Block::from_json(&json).unwrap();
    assert_eq!(from_json.to_raw_hex(), GENESIS_HEX);
    assert_eq!(from_json.height(), 0);

    let compact = block.to_compact();
    assert_eq!(compact.block, GENESIS_HEX);
    assert_eq!(compact.hash, block.hash().to_hex());
    let from_compact = Block::from_compact(&compact).unwrap();
    assert_eq!(from_compact.rhash(), GENESIS_HASH);
    assert_eq!(from_compact.height(), 0);
}
