use std::sync::Arc;

use crate::error::{InteropError, InteropResult};
use crate::ledger::{Block, ContractState, Header, Transaction};
use crate::storage::StorageContext;

/// Typed reference to a host object surfaced onto the evaluation
/// stack. Handles are shared by reference from the snapshot's object
/// graph and are never serializable.
#[derive(Debug, Clone)]
pub enum InteropHandle {
    Header(Arc<Header>),
    Block(Arc<Block>),
    Transaction(Arc<Transaction>),
    Contract(Arc<ContractState>),
    StorageContext(StorageContext),
}

impl InteropHandle {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Header(_) => "Header",
            Self::Block(_) => "Block",
            Self::Transaction(_) => "Transaction",
            Self::Contract(_) => "Contract",
            Self::StorageContext(_) => "StorageContext",
        }
    }

    /// Views the handle as a header. Block handles expose their own
    /// header, matching the accessor surface.
    pub fn as_header(&self) -> InteropResult<&Header> {
        match self {
            Self::Header(header) => Ok(header),
            Self::Block(block) => Ok(&block.header),
            other => Err(InteropError::invalid_argument(
                "a header or block handle",
                other.kind_name(),
            )),
        }
    }

    pub fn as_block(&self) -> InteropResult<&Arc<Block>> {
        match self {
            Self::Block(block) => Ok(block),
            other => Err(InteropError::invalid_argument(
                "a block handle",
                other.kind_name(),
            )),
        }
    }

    pub fn as_transaction(&self) -> InteropResult<&Arc<Transaction>> {
        match self {
            Self::Transaction(transaction) => Ok(transaction),
            other => Err(InteropError::invalid_argument(
                "a transaction handle",
                other.kind_name(),
            )),
        }
    }

    pub fn as_contract(&self) -> InteropResult<&ContractState> {
        match self {
            Self::Contract(contract) => Ok(contract),
            other => Err(InteropError::invalid_argument(
                "a contract handle",
                other.kind_name(),
            )),
        }
    }

    pub fn as_storage_context(&self) -> InteropResult<StorageContext> {
        match self {
            Self::StorageContext(context) => Ok(*context),
            other => Err(InteropError::invalid_argument(
                "a storage context handle",
                other.kind_name(),
            )),
        }
    }
}

impl PartialEq for InteropHandle {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Header(a), Self::Header(b)) => Arc::ptr_eq(a, b),
            (Self::Block(a), Self::Block(b)) => Arc::ptr_eq(a, b),
            (Self::Transaction(a), Self::Transaction(b)) => Arc::ptr_eq(a, b),
            (Self::Contract(a), Self::Contract(b)) => Arc::ptr_eq(a, b),
            (Self::StorageContext(a), Self::StorageContext(b)) => a == b,
            _ => false,
        }
    }
}
