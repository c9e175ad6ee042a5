//! Property-based and adversarial tests for the block core
//!
//! These tests check that invariants hold under random inputs and hostile blocks.

use proptest::prelude::*;
use block_core::consensus::{block_subsidy, BlockHeader, ValidationError};
use block_core::constants::{COIN, INITIAL_SUBSIDY, MAX_HALVINGS};
use block_core::crypto::{compute_merkle_root, double_hash, Hash};
use block_core::validation::{OutPoint, Script, Transaction, TxInput, TxOutput};
use block_core::{Block, BlockValidator, Network};

fn spend(prev: [u8; 32], value: i64, script: Vec<u8>) -> Transaction {
    Transaction::new(
        vec![TxInput {
            prevout: OutPoint::new(Hash::from_bytes(prev), 0),
            script: Script::new(script.clone()),
            sequence: 0xFFFF_FFFF,
        }],
        vec![TxOutput {
            value,
            script: Script::new(script),
        }],
    )
}

fn coinbase(height: i64) -> Transaction {
    Transaction::coinbase(height, b"prop", 50 * COIN, Script::new(vec![0xac]))
}

fn make_block(txs: Vec<Transaction>) -> Block {
    let hashes: Vec<Hash> = txs.iter().map(Transaction::hash).collect();
    let header = BlockHeader::new(2, Hash::zero(), compute_merkle_root(&hashes), 0, 0x207fffff, 0);
    Block::new(header, txs)
}

fn accept_all() -> BlockValidator<fn(&BlockHeader) -> bool> {
    let headers: fn(&BlockHeader) -> bool = |_| true;
    BlockValidator::new(Network::Main.params(), headers)
}

fn arb_spends(max: usize) -> impl Strategy<Value = Vec<Transaction>> {
    prop::collection::vec(
        (any::<[u8; 32]>(), 0i64..21_000_000 * COIN, prop::collection::vec(any::<u8>(), 0..40)),
        1..max,
    )
    .prop_map(|items| {
        items
            .into_iter()
            .enumerate()
            .map(|(i, (mut prev, value, script))| {
                // Distinct prevouts keep the generated txids distinct
                prev[..8].copy_from_slice(&(i as u64).to_le_bytes());
                spend(prev, value, script)
            })
            .collect()
    })
}

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

proptest! {
    /// Subsidy never grows with height
    #[test]
    fn prop_subsidy_non_increasing(a in 0i32..20_000_000, b in 0i32..20_000_000) {
        let params = Network::Main.params();
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(block_subsidy(low, params) >= block_subsidy(high, params));
    }

    /// Subsidy is exhausted after the last halving
    #[test]
    fn prop_subsidy_zero_after_max_halvings(height in (MAX_HALVINGS * 150)..i32::MAX) {
        prop_assert_eq!(block_subsidy(height, Network::Regtest.params()), 0);
    }

    /// Subsidy is a right shift of the initial subsidy
    #[test]
    fn prop_subsidy_is_shifted_initial(height in 0i32..(MAX_HALVINGS * 210_000)) {
        let params = Network::Main.params();
        let halvings = height / params.halving_interval;
        prop_assert_eq!(block_subsidy(height, params), INITIAL_SUBSIDY >> halvings);
    }

    /// Merkle root is a pure function of the hash list
    #[test]
    fn prop_merkle_root_deterministic(leaves in prop::collection::vec(any::<[u8; 32]>(), 0..20)) {
        let hashes: Vec<Hash> = leaves.into_iter().map(Hash::from_bytes).collect();
        prop_assert_eq!(compute_merkle_root(&hashes), compute_merkle_root(&hashes));
    }

    /// A single hash is its own root
    #[test]
    fn prop_merkle_single_leaf(leaf in any::<[u8; 32]>()) {
        let hash = Hash::from_bytes(leaf);
        prop_assert_eq!(compute_merkle_root(&[hash]), hash);
    }

    /// Every encoding reproduces the same wire bytes and hash
    #[test]
    fn prop_encodings_agree(spends in arb_spends(6), height in -1i32..1_000_000) {
        let mut txs = vec![coinbase(height.max(0) as i64)];
        txs.extend(spends);
        let block = make_block(txs).with_height(height).with_relayed_by("10.0.0.1");

        let raw = Block::from_raw(&block.to_raw()).unwrap();
        prop_assert_eq!(raw.hash(), block.hash());
        prop_assert_eq!(raw.txs(), block.txs());

        let json = Block::from_json_str(&block.to_json_string().unwrap()).unwrap();
        prop_assert_eq!(json.to_raw(), block.to_raw());
        prop_assert_eq!(json.height(), height);

        let compact = Block::from_compact_bytes(&block.to_compact_bytes().unwrap()).unwrap();
        prop_assert_eq!(compact.hash(), block.hash());
        prop_assert_eq!(compact.relayed_by(), "10.0.0.1");
    }

    /// Raw decoding never panics on arbitrary input
    #[test]
    fn prop_raw_decode_total(bytes in prop::collection::vec(any::<u8>(), 0..400)) {
        let _ = Block::from_raw(&bytes);
    }

    /// Well-formed generated blocks pass the structural checks
    #[test]
    fn prop_generated_blocks_valid(spends in arb_spends(10)) {
        let mut txs = vec![coinbase(7)];
        txs.extend(spends);
        prop_assert_eq!(accept_all().verify(&make_block(txs)), Ok(()));
    }

    /// A repeated transaction is caught wherever the copy lands
    #[test]
    fn prop_duplicate_txid_detected(
        spends in arb_spends(8),
        pick in any::<prop::sample::Index>(),
        at in any::<prop::sample::Index>(),
    ) {
        let dup = spends[pick.index(spends.len())].clone();
        let mut txs = spends;
        txs.insert(at.index(txs.len() + 1), dup.clone());
        txs.insert(0, coinbase(7));

        prop_assert_eq!(
            accept_all().verify(&make_block(txs)),
            Err(ValidationError::DuplicateTxid(dup.hash()))
        );
    }

    /// Any single flipped bit of the merkle root rejects the block
    #[test]
    fn prop_merkle_bit_flip_detected(spends in arb_spends(5), bit in 0usize..256) {
        let mut txs = vec![coinbase(3)];
        txs.extend(spends);
        let block = make_block(txs);

        let mut header = *block.header();
        header.merkle_root.0[bit / 8] ^= 1 << (bit % 8);
        let tampered = Block::new(header, block.txs().to_vec());

        let is_mismatch = matches!(
            accept_all().verify(&tampered),
            Err(ValidationError::MerkleRootMismatch { .. })
        );
        prop_assert!(is_mismatch);
    }

    /// Version 2 coinbases round-trip their committed height
    #[test]
    fn prop_coinbase_height_roundtrip(height in 0i64..=0x7fff_ffff) {
        let block = make_block(vec![coinbase(height)]);
        prop_assert_eq!(block.coinbase_height(), height);
    }

    /// Without a known height nothing is claimed about fees
    #[test]
    fn prop_unknown_height_has_no_fee(value in 0i64..100 * COIN) {
        let txs = vec![Transaction::coinbase(1, b"", value, Script::default())];
        prop_assert_eq!(make_block(txs).fee(), 0);
    }
}

// ============================================================================
// ADVERSARIAL TESTS
// ============================================================================

/// A second coinbase hidden behind ordinary transactions
#[test]
fn test_late_coinbase_rejected() {
    let txs = vec![
        coinbase(1),
        spend([1; 32], COIN, vec![]),
        spend([2; 32], COIN, vec![]),
        coinbase(1),
    ];
    assert_eq!(
        accept_all().verify(&make_block(txs)),
        Err(ValidationError::MultipleCoinbase { index: 3 })
    );
}

/// A repeated transaction ahead of a second coinbase is reported first
#[test]
fn test_duplicate_before_late_coinbase() {
    let a = spend([1; 32], COIN, vec![]);
    let txs = vec![coinbase(1), a.clone(), a.clone(), coinbase(2)];
    assert_eq!(
        accept_all().verify(&make_block(txs)),
        Err(ValidationError::DuplicateTxid(a.hash()))
    );
}

/// Duplicating the tail transaction keeps the merkle root but not validity
#[test]
fn test_merkle_tail_duplication_rejected() {
    let a = spend([1; 32], COIN, vec![]);
    let b = spend([2; 32], COIN, vec![]);
    let honest = make_block(vec![coinbase(1), a.clone(), b.clone()]);
    let forged = Block::new(*honest.header(), vec![coinbase(1), a, b.clone(), b.clone()]);

    assert_eq!(forged.compute_merkle_root(), *honest.merkle_root());
    assert_eq!(accept_all().verify(&honest), Ok(()));
    assert_eq!(
        accept_all().verify(&forged),
        Err(ValidationError::DuplicateTxid(b.hash()))
    );
}

/// Coinbase claiming more than subsidy plus fees still reports the difference
#[test]
fn test_overpaying_coinbase_fee() {
    let txs = vec![Transaction::coinbase(5, b"", 60 * COIN, Script::default())];
    let block = make_block(txs).with_height(5);
    assert_eq!(block.base_reward(), 50 * COIN);
    assert_eq!(block.fee(), 10 * COIN);
}

/// Coinbase paying less than the subsidy yields a negative fee
#[test]
fn test_underpaying_coinbase_fee() {
    let txs = vec![Transaction::coinbase(5, b"", 40 * COIN, Script::default())];
    let block = make_block(txs).with_height(5);
    assert_eq!(block.fee(), -10 * COIN);
}

/// Version 1 blocks never report a coinbase height
#[test]
fn test_version_one_has_no_coinbase_height() {
    let txs = vec![coinbase(100)];
    let hashes: Vec<Hash> = txs.iter().map(Transaction::hash).collect();
    let header = BlockHeader::new(1, Hash::zero(), compute_merkle_root(&hashes), 0, 0x207fffff, 0);
    assert_eq!(Block::new(header, txs).coinbase_height(), -1);
}

/// Truncated wire bytes are reported as truncation, not as garbage
#[test]
fn test_truncated_block_rejected() {
    let block = make_block(vec![coinbase(1), spend([9; 32], COIN, vec![0x51])]);
    let raw = block.to_raw();
    for cut in 0..raw.len() {
        assert!(Block::from_raw(&raw[..cut]).is_err(), "cut at {} decoded", cut);
    }
    for cut in [0, 1, 79, 80, raw.len() - 1] {
        let err = Block::from_raw(&raw[..cut]).unwrap_err();
        assert!(err.is_truncation(), "cut at {} gave {:?}", cut, err);
    }
}

/// Two blocks built from the same parts share their identity
#[test]
fn test_block_hash_deterministic() {
    let a = make_block(vec![coinbase(1)]);
    let b = make_block(vec![coinbase(1)]);
    assert_eq!(a.hash(), b.hash());
    assert_ne!(a.hash(), double_hash(&[]));
}
