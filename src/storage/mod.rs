//! The contract storage namespace: capability contexts, composite
//! keys and stored items.

use bitflags::bitflags;

use crate::error::{InteropError, InteropResult};
use crate::types::{UInt160, UINT160_SIZE};

bitflags! {
    /// Modifiers accepted by `Storage.PutEx`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StorageFlags: u8 {
        /// Latches the entry as constant: it can no longer be
        /// rewritten or deleted.
        const CONSTANT = 0x01;
    }
}

/// Capability handle granting read or read/write access to one
/// contract's storage partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageContext {
    pub script_hash: UInt160,
    pub read_only: bool,
}

impl StorageContext {
    /// A writable context over `script_hash`'s partition.
    pub fn new(script_hash: UInt160) -> Self {
        Self {
            script_hash,
            read_only: false,
        }
    }

    /// The same partition, demoted to read-only.
    pub fn as_read_only(&self) -> Self {
        Self {
            script_hash: self.script_hash,
            read_only: true,
        }
    }
}

/// Composite key addressing one entry: the owning contract's script
/// hash plus the raw key bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey {
    pub script_hash: UInt160,
    pub key: Vec<u8>,
}

impl StorageKey {
    pub fn new(script_hash: UInt160, key: impl Into<Vec<u8>>) -> Self {
        Self {
            script_hash,
            key: key.into(),
        }
    }

    /// Flat byte form used by the backing store and by prefix scans:
    /// the 20 script-hash bytes in little-endian order, then the key.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(UINT160_SIZE + self.key.len());
        bytes.extend_from_slice(self.script_hash.as_le_bytes());
        bytes.extend_from_slice(&self.key);
        bytes
    }

    /// Inverse of [`to_bytes`](Self::to_bytes).
    pub fn parse(bytes: &[u8]) -> InteropResult<Self> {
        if bytes.len() < UINT160_SIZE {
            return Err(InteropError::deformed("storage key shorter than a script hash"));
        }
        Ok(Self {
            script_hash: UInt160::from_slice(&bytes[..UINT160_SIZE])?,
            key: bytes[UINT160_SIZE..].to_vec(),
        })
    }
}

/// A stored value plus its immutability latch. Once `is_constant` is
/// set the entry may neither be rewritten nor deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageItem {
    pub value: Vec<u8>,
    pub is_constant: bool,
}

impl StorageItem {
    pub fn new(value: Vec<u8>, is_constant: bool) -> Self {
        Self { value, is_constant }
    }

    pub fn from_bytes(value: Vec<u8>) -> Self {
        Self {
            value,
            is_constant: false,
        }
    }
}
