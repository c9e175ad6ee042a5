//! Header checks: proof of work and timestamp
//!
//! The block core only needs a yes/no answer about the header; the
//! [`HeaderVerifier`] trait is that seam. [`ProofOfWork`] is the
//! consensus implementation.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::ChainParams;
use crate::consensus::BlockHeader;
use crate::crypto::Hash;

/// Capability to validate header facts
pub trait HeaderVerifier {
    fn verify_headers(&self, header: &BlockHeader) -> bool;
}

impl<F> HeaderVerifier for F
where
    F: Fn(&BlockHeader) -> bool,
{
    fn verify_headers(&self, header: &BlockHeader) -> bool {
        self(header)
    }
}

/// Proof-of-work and future-timestamp checks for a network
#[derive(Debug, Clone)]
pub struct ProofOfWork {
    pow_limit: [u8; 32],
    max_future_drift: u32,
    /// Fixed clock for deterministic checks; system time when `None`
    now: Option<u32>,
}

impl ProofOfWork {
    pub fn new(params: &ChainParams) -> Self {
        Self {
            pow_limit: compact_to_target(params.pow_limit_bits).unwrap_or([0xff; 32]),
            max_future_drift: params.max_future_drift,
            now: None,
        }
    }

    /// Judge timestamps against a fixed clock
    pub fn at_time(mut self, now: u32) -> Self {
        self.now = Some(now);
        self
    }

    fn now(&self) -> u32 {
        self.now.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs().min(u32::MAX as u64) as u32)
                .unwrap_or(0)
        })
    }
}

impl HeaderVerifier for ProofOfWork {
    fn verify_headers(&self, header: &BlockHeader) -> bool {
        let Some(target) = compact_to_target(header.bits) else {
            tracing::debug!(bits = header.bits, "header has invalid target");
            return false;
        };

        if target > self.pow_limit {
            tracing::debug!(bits = header.bits, "header target above proof-of-work limit");
            return false;
        }

        let hash = header.hash();
        if !hash_meets_target(&hash, &target) {
            tracing::debug!(hash = %hash, "header fails proof of work");
            return false;
        }

        if header.ts as u64 > self.now() as u64 + self.max_future_drift as u64 {
            tracing::debug!(ts = header.ts, "header timestamp too far in the future");
            return false;
        }

        true
    }
}

/// Convert compact difficulty to a big-endian 256-bit target
///
/// Returns `None` for negative, zero or overflowing targets.
pub fn compact_to_target(compact: u32) -> Option<[u8; 32]> {
    let exponent = (compact >> 24) as usize;
    let mut mantissa = compact & 0x007F_FFFF;

    if compact & 0x0080_0000 != 0 && mantissa != 0 {
        return None;
    }

    let overflow = mantissa != 0
        && (exponent > 34
            || (mantissa > 0xff && exponent > 33)
            || (mantissa > 0xffff && exponent > 32));
    if overflow {
        return None;
    }

    let mut target = [0u8; 32];
    if exponent <= 3 {
        mantissa >>= 8 * (3 - exponent);
        target[29..].copy_from_slice(&mantissa.to_be_bytes()[1..]);
    } else {
        // Most significant mantissa byte lands `exponent` bytes from the end
        let start = 32 - exponent as isize;
        for (i, byte) in mantissa.to_be_bytes()[1..].iter().enumerate() {
            let pos = start + i as isize;
            if (0..32).contains(&pos) {
                target[pos as usize] = *byte;
            }
        }
    }

    if target == [0u8; 32] {
        return None;
    }
    Some(target)
}

/// Block hashes are little-endian numbers; compare against a big-endian target
pub fn hash_meets_target(hash: &Hash, target: &[u8; 32]) -> bool {
    hash.reversed().0 <= *target
}
