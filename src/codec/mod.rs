//! Block encodings
//!
//! Three independent representations of the same block:
//! - raw: the consensus wire bytes
//! - JSON: a field-by-field mirror with hashes in display order
//! - compact: storage form embedding the raw bytes plus chain metadata

mod compact;
mod error;
mod json;
mod raw;
mod wire;

pub use compact::*;
pub use error::*;
pub use json::*;
pub use raw::*;
pub use wire::*;
