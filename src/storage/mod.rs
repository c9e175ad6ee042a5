//! Storage module - key/value database and block persistence
//!
//! A thin adapter over sled. Blocks are stored in their compact form.

mod blocks;
mod db;

pub use blocks::*;
pub use db::*;

use thiserror::Error;

use crate::codec::CodecError;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Db(#[from] sled::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corrupt stored block: {0}")]
    Codec(#[from] CodecError),
}
