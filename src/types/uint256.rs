use core::fmt;

use crate::error::{InteropError, InteropResult};

pub const UINT256_SIZE: usize = 32;

/// Little-endian 256-bit identifier (a block or transaction hash).
#[derive(Debug, Copy, Clone, Default, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct UInt256([u8; UINT256_SIZE]);

impl UInt256 {
    pub const LEN: usize = UINT256_SIZE;

    /// The all-zero hash.
    pub const fn zero() -> Self {
        Self([0u8; UINT256_SIZE])
    }

    #[inline]
    pub const fn from_le_bytes(src: [u8; UINT256_SIZE]) -> Self {
        Self(src)
    }

    /// Builds a hash from a 32-byte slice.
    pub fn from_slice(src: &[u8]) -> InteropResult<Self> {
        let bytes: [u8; UINT256_SIZE] = src.try_into().map_err(|_| {
            InteropError::invalid_argument("a 32-byte hash", format!("{} bytes", src.len()))
        })?;
        Ok(Self(bytes))
    }

    #[inline]
    pub const fn as_le_bytes(&self) -> &[u8; UINT256_SIZE] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl AsRef<[u8]> for UInt256 {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for UInt256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reversed = self.0;
        reversed.reverse();
        write!(f, "0x{}", hex::encode(reversed))
    }
}
