//! Transactions and their scripts, as consumed by the block core

mod script;
mod transaction;

pub use script::*;
pub use transaction::*;
