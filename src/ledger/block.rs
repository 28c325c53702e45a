use std::sync::Arc;

use super::{Header, Transaction};
use crate::types::UInt256;

/// A full block: its header plus the ordered transaction list. The
/// block hash is the header hash.
#[derive(Debug, Clone)]
pub struct Block {
    pub header: Header,
    pub transactions: Vec<Arc<Transaction>>,
}

impl Block {
    pub fn new(header: Header, transactions: Vec<Arc<Transaction>>) -> Self {
        Self {
            header,
            transactions,
        }
    }

    pub fn hash(&self) -> UInt256 {
        self.header.hash()
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }
}
