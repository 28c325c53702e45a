use once_cell::sync::OnceCell;

use crate::crypto;
use crate::io::BinaryWriter;
use crate::types::{UInt160, UInt256};

/// A block header. The hash is the double SHA-256 of the little-endian
/// encoding of the unsigned fields, computed once and cached.
#[derive(Debug, Clone, Default)]
pub struct Header {
    pub version: u32,
    pub prev_hash: UInt256,
    pub merkle_root: UInt256,
    pub timestamp: u32,
    pub index: u32,
    pub consensus_data: u64,
    pub next_consensus: UInt160,
    hash: OnceCell<UInt256>,
}

impl Header {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        version: u32,
        prev_hash: UInt256,
        merkle_root: UInt256,
        timestamp: u32,
        index: u32,
        consensus_data: u64,
        next_consensus: UInt160,
    ) -> Self {
        Self {
            version,
            prev_hash,
            merkle_root,
            timestamp,
            index,
            consensus_data,
            next_consensus,
            hash: OnceCell::new(),
        }
    }

    fn write_unsigned(&self, writer: &mut BinaryWriter) {
        writer.write_u32(self.version);
        writer.write_bytes(self.prev_hash.as_le_bytes());
        writer.write_bytes(self.merkle_root.as_le_bytes());
        writer.write_u32(self.timestamp);
        writer.write_u32(self.index);
        writer.write_u64(self.consensus_data);
        writer.write_bytes(self.next_consensus.as_le_bytes());
    }

    pub fn hash(&self) -> UInt256 {
        *self.hash.get_or_init(|| {
            let mut writer = BinaryWriter::with_capacity(104);
            self.write_unsigned(&mut writer);
            crypto::hash256(writer.as_slice())
        })
    }
}
