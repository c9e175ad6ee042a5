//! Block reward calculation
//!
//! The subsidy starts at 50 coins and halves every `halving_interval`
//! blocks. Halving is an integer right shift so every node computes the same
//! amount; after 64 halvings the subsidy is zero.

use serde::{Deserialize, Serialize};

use crate::config::ChainParams;
use crate::constants::{COIN, MAX_HALVINGS};

/// Base subsidy for a block at `height`
///
/// This is a pure, deterministic function. Negative heights (unknown
/// position in the chain) earn nothing.
pub fn block_subsidy(height: i32, params: &ChainParams) -> i64 {
    if height < 0 {
        return 0;
    }

    let halvings = height / params.halving_interval;
    if halvings >= MAX_HALVINGS {
        return 0;
    }

    params.initial_subsidy >> halvings
}

/// Total subsidy paid by blocks `0..=height`
///
/// Sums whole halving eras at once instead of walking every block.
pub fn total_subsidy(height: i32, params: &ChainParams) -> i64 {
    if height < 0 {
        return 0;
    }

    let interval = params.halving_interval as i64;
    let blocks = height as i64 + 1;
    let mut total: i64 = 0;
    let mut era_start: i64 = 0;

    while era_start < blocks {
        let era_blocks = (blocks - era_start).min(interval);
        let subsidy = block_subsidy(era_start as i32, params);
        if subsidy == 0 {
            break;
        }
        total = total.saturating_add(subsidy.saturating_mul(era_blocks));
        era_start += interval;
    }

    total
}

/// Reward breakdown of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSummary {
    /// Subsidy due at the block's height
    pub base: i64,
    /// Total value paid out by the coinbase
    pub reward: i64,
    /// `reward - base`; negative when the coinbase under-pays
    pub fee: i64,
}

/// Format base units as a decimal coin amount: `"50.0"`, `"0.0001"`
pub fn format_amount(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let value = value.unsigned_abs();
    let whole = value / COIN as u64;
    let frac = format!("{:08}", value % COIN as u64);
    let frac = frac.trim_end_matches('0');
    let frac = if frac.is_empty() { "0" } else { frac };
    format!("{}{}.{}", sign, whole, frac)
}
