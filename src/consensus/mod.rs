//! Consensus module - Block structure, header checks, validation, and rewards

mod block;
mod header;
mod pow;
mod rewards;
mod validation;

pub use block::*;
pub use header::*;
pub use pow::*;
pub use rewards::*;
pub use validation::*;
