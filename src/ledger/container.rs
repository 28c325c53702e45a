use std::sync::Arc;

use super::{Block, Transaction};
use crate::snapshot::Snapshot;
use crate::stack_value::InteropHandle;
use crate::types::{UInt160, UInt256};

/// The enclosing transaction or block whose signatures authorize the
/// current execution.
#[derive(Debug, Clone)]
pub enum ScriptContainer {
    Transaction(Arc<Transaction>),
    Block(Arc<Block>),
}

impl ScriptContainer {
    pub fn hash(&self) -> UInt256 {
        match self {
            Self::Transaction(tx) => tx.hash(),
            Self::Block(block) => block.hash(),
        }
    }

    /// The script hashes that must have signed this container.
    /// Transactions declare them through their witnesses; a block is
    /// vouched for by the consensus address recorded in its parent
    /// header, when the snapshot can resolve it.
    pub fn verifying_hashes(&self, snapshot: &dyn Snapshot) -> Vec<UInt160> {
        match self {
            Self::Transaction(tx) => tx.witness_hashes(),
            Self::Block(block) => snapshot
                .header(&block.header.prev_hash)
                .map(|parent| vec![parent.next_consensus])
                .unwrap_or_default(),
        }
    }

    /// Wraps the container for the evaluation stack.
    pub fn to_handle(&self) -> InteropHandle {
        match self {
            Self::Transaction(tx) => InteropHandle::Transaction(Arc::clone(tx)),
            Self::Block(block) => InteropHandle::Block(Arc::clone(block)),
        }
    }
}
