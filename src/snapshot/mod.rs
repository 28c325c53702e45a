//! The read/write view of ledger state consumed by syscall handlers.

mod memory;

pub use memory::{MemorySnapshot, MemoryStore, SharedStore};

use std::sync::Arc;

use crate::error::InteropResult;
use crate::ledger::{Block, ContractState, Header, Transaction};
use crate::storage::{StorageItem, StorageKey};
use crate::types::{UInt160, UInt256};

/// Keyed lookups over blocks, transactions, contracts and storage,
/// plus a commit operation flushing accumulated writes to the durable
/// store. A snapshot is exclusively owned by one session for the
/// session's lifetime.
pub trait Snapshot {
    /// Height of the best block.
    fn height(&self) -> u32;

    /// Header of the best block, if the chain is non-empty.
    fn current_header(&self) -> Option<Arc<Header>>;

    /// Canonical block hash at `index`.
    fn header_hash_at(&self, index: u32) -> Option<UInt256>;

    fn header(&self, hash: &UInt256) -> Option<Arc<Header>>;

    fn block(&self, hash: &UInt256) -> Option<Arc<Block>>;

    fn transaction(&self, hash: &UInt256) -> Option<Arc<Transaction>>;

    /// Height of the block containing the transaction.
    fn transaction_height(&self, hash: &UInt256) -> Option<u32>;

    fn contract(&self, hash: &UInt160) -> Option<ContractState>;

    fn put_contract(&mut self, contract: ContractState);

    fn delete_contract(&mut self, hash: &UInt160);

    fn storage_get(&self, key: &StorageKey) -> Option<StorageItem>;

    fn storage_put(&mut self, key: StorageKey, item: StorageItem);

    fn storage_delete(&mut self, key: &StorageKey);

    /// All entries whose composite key bytes start with `prefix`, in
    /// ascending byte order of the composite key. Iteration order is
    /// consensus-visible and must be deterministic.
    fn storage_find(&self, prefix: &[u8]) -> Vec<(StorageKey, StorageItem)>;

    /// The block currently being persisted, when this execution runs
    /// inside block persistence.
    fn persisting_block(&self) -> Option<Arc<Block>>;

    /// Flushes accumulated writes to the durable store.
    fn commit(&mut self) -> InteropResult<()>;
}
