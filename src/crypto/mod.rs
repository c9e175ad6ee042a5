//! Cryptography module - double SHA-256 identities and merkle roots

mod hash;
mod merkle;

pub use hash::*;
pub use merkle::*;
