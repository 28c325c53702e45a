//! Protocol settings consumed by the interop services.

use serde::Deserialize;

use crate::constants::SECONDS_PER_BLOCK;

/// Network-wide parameters the syscall surface depends on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProtocolSettings {
    /// The magic number of the network.
    pub network: u32,

    /// The version byte used when rendering script hashes as addresses.
    pub address_version: u8,

    /// Target seconds between two blocks; feeds `Runtime.GetTime` when
    /// no block is being persisted.
    pub seconds_per_block: u32,
}

impl Default for ProtocolSettings {
    fn default() -> Self {
        Self {
            network: 7_630_401,
            address_version: 0x17,
            seconds_per_block: SECONDS_PER_BLOCK,
        }
    }
}
