use core::fmt;

use crate::error::{InteropError, InteropResult};

pub const UINT160_SIZE: usize = 20;

/// Little-endian 160-bit identifier (a script hash).
#[derive(Debug, Copy, Clone, Default, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct UInt160([u8; UINT160_SIZE]);

impl UInt160 {
    pub const LEN: usize = UINT160_SIZE;

    /// The all-zero hash.
    pub const fn zero() -> Self {
        Self([0u8; UINT160_SIZE])
    }

    #[inline]
    pub const fn from_le_bytes(src: [u8; UINT160_SIZE]) -> Self {
        Self(src)
    }

    /// Builds a hash from a 20-byte slice.
    pub fn from_slice(src: &[u8]) -> InteropResult<Self> {
        let bytes: [u8; UINT160_SIZE] = src.try_into().map_err(|_| {
            InteropError::invalid_argument("a 20-byte hash", format!("{} bytes", src.len()))
        })?;
        Ok(Self(bytes))
    }

    #[inline]
    pub const fn as_le_bytes(&self) -> &[u8; UINT160_SIZE] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl AsRef<[u8]> for UInt160 {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for UInt160 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reversed = self.0;
        reversed.reverse();
        write!(f, "0x{}", hex::encode(reversed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_rejects_wrong_length() {
        assert!(UInt160::from_slice(&[0u8; 19]).is_err());
        assert!(UInt160::from_slice(&[0u8; 21]).is_err());
        assert!(UInt160::from_slice(&[0u8; 20]).is_ok());
    }

    #[test]
    fn display_reverses_bytes() {
        let mut bytes = [0u8; 20];
        bytes[0] = 0x01;
        bytes[19] = 0xff;
        let hash = UInt160::from_le_bytes(bytes);
        let rendered = hash.to_string();
        assert!(rendered.starts_with("0xff"));
        assert!(rendered.ends_with("01"));
    }
}
