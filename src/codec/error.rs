//! Decode errors shared by the three block encodings

use thiserror::Error;

/// Errors raised while decoding a block or transaction
#[derive(Debug, Error)]
pub enum CodecError {
    /// The input ended before a field could be read
    #[error("Unexpected end of data: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },
    #[error("{0} trailing bytes after block")]
    TrailingBytes(usize),
    #[error("Non-canonical variable length integer")]
    NonCanonicalVarInt,
    #[error("Malformed encoding: {0}")]
    Malformed(String),
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("Invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    /// True when the input was cut short rather than malformed
    pub fn is_truncation(&self) -> bool {
        matches!(self, CodecError::UnexpectedEnd { .. })
    }
}
