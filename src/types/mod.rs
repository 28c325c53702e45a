//! Fixed-width identifiers and the Fixed8 decimal.

mod fixed8;
mod uint160;
mod uint256;

pub use fixed8::Fixed8;
pub use uint160::{UInt160, UINT160_SIZE};
pub use uint256::{UInt256, UINT256_SIZE};
