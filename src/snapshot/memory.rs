use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;

use super::Snapshot;
use crate::error::InteropResult;
use crate::ledger::{Block, ContractState, Header, Transaction};
use crate::storage::{StorageItem, StorageKey};
use crate::types::{UInt160, UInt256};

/// Shared handle to a [`MemoryStore`].
pub type SharedStore = Arc<RwLock<MemoryStore>>;

/// In-memory durable store: the chain index plus contract and storage
/// tables. Storages are kept in a `BTreeMap` over composite key bytes
/// so prefix scans iterate in a deterministic order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    headers: HashMap<UInt256, Arc<Header>>,
    header_index: Vec<UInt256>,
    blocks: HashMap<UInt256, Arc<Block>>,
    transactions: HashMap<UInt256, (u32, Arc<Transaction>)>,
    contracts: HashMap<UInt160, ContractState>,
    storages: BTreeMap<Vec<u8>, StorageItem>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a fresh store for sharing between snapshots.
    pub fn shared() -> SharedStore {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Indexes a block: its header at the block's height, and every
    /// transaction under its hash.
    pub fn add_block(&mut self, block: Block) {
        let block = Arc::new(block);
        let hash = block.hash();
        let index = block.header.index as usize;
        if self.header_index.len() <= index {
            self.header_index.resize(index + 1, UInt256::zero());
        }
        self.header_index[index] = hash;
        self.headers.insert(hash, Arc::new(block.header.clone()));
        for tx in &block.transactions {
            self.transactions
                .insert(tx.hash(), (block.header.index, Arc::clone(tx)));
        }
        self.blocks.insert(hash, block);
    }

    pub fn put_contract(&mut self, contract: ContractState) {
        self.contracts.insert(contract.script_hash(), contract);
    }

    pub fn height(&self) -> u32 {
        self.header_index.len().saturating_sub(1) as u32
    }
}

/// Write-back cache over a [`SharedStore`]. Reads consult the local
/// caches first; `commit` flushes them into the store. Dropping an
/// uncommitted snapshot discards its writes.
#[derive(Debug)]
pub struct MemorySnapshot {
    store: SharedStore,
    persisting_block: Option<Arc<Block>>,
    contracts: HashMap<UInt160, Option<ContractState>>,
    storages: BTreeMap<Vec<u8>, Option<StorageItem>>,
}

impl MemorySnapshot {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            persisting_block: None,
            contracts: HashMap::new(),
            storages: BTreeMap::new(),
        }
    }

    /// Marks the block this snapshot is persisting, making it visible
    /// to `Runtime.GetTime`.
    pub fn with_persisting_block(mut self, block: Arc<Block>) -> Self {
        self.persisting_block = Some(block);
        self
    }
}

impl Snapshot for MemorySnapshot {
    fn height(&self) -> u32 {
        self.store.read().height()
    }

    fn current_header(&self) -> Option<Arc<Header>> {
        let store = self.store.read();
        let hash = store.header_index.last()?;
        store.headers.get(hash).cloned()
    }

    fn header_hash_at(&self, index: u32) -> Option<UInt256> {
        let store = self.store.read();
        let hash = store.header_index.get(index as usize)?;
        if hash.is_zero() {
            None
        } else {
            Some(*hash)
        }
    }

    fn header(&self, hash: &UInt256) -> Option<Arc<Header>> {
        self.store.read().headers.get(hash).cloned()
    }

    fn block(&self, hash: &UInt256) -> Option<Arc<Block>> {
        self.store.read().blocks.get(hash).cloned()
    }

    fn transaction(&self, hash: &UInt256) -> Option<Arc<Transaction>> {
        self.store
            .read()
            .transactions
            .get(hash)
            .map(|(_, tx)| Arc::clone(tx))
    }

    fn transaction_height(&self, hash: &UInt256) -> Option<u32> {
        self.store
            .read()
            .transactions
            .get(hash)
            .map(|(height, _)| *height)
    }

    fn contract(&self, hash: &UInt160) -> Option<ContractState> {
        if let Some(cached) = self.contracts.get(hash) {
            return cached.clone();
        }
        self.store.read().contracts.get(hash).cloned()
    }

    fn put_contract(&mut self, contract: ContractState) {
        self.contracts
            .insert(contract.script_hash(), Some(contract));
    }

    fn delete_contract(&mut self, hash: &UInt160) {
        self.contracts.insert(*hash, None);
    }

    fn storage_get(&self, key: &StorageKey) -> Option<StorageItem> {
        let bytes = key.to_bytes();
        if let Some(cached) = self.storages.get(&bytes) {
            return cached.clone();
        }
        self.store.read().storages.get(&bytes).cloned()
    }

    fn storage_put(&mut self, key: StorageKey, item: StorageItem) {
        self.storages.insert(key.to_bytes(), Some(item));
    }

    fn storage_delete(&mut self, key: &StorageKey) {
        self.storages.insert(key.to_bytes(), None);
    }

    fn storage_find(&self, prefix: &[u8]) -> Vec<(StorageKey, StorageItem)> {
        let mut merged: BTreeMap<Vec<u8>, StorageItem> = self
            .store
            .read()
            .storages
            .iter()
            .filter(|(bytes, _)| bytes.starts_with(prefix))
            .map(|(bytes, item)| (bytes.clone(), item.clone()))
            .collect();
        for (bytes, entry) in &self.storages {
            if !bytes.starts_with(prefix) {
                continue;
            }
            match entry {
                Some(item) => {
                    merged.insert(bytes.clone(), item.clone());
                }
                None => {
                    merged.remove(bytes);
                }
            }
        }
        merged
            .into_iter()
            .filter_map(|(bytes, item)| StorageKey::parse(&bytes).ok().map(|key| (key, item)))
            .collect()
    }

    fn persisting_block(&self) -> Option<Arc<Block>> {
        self.persisting_block.clone()
    }

    fn commit(&mut self) -> InteropResult<()> {
        let mut store = self.store.write();
        for (hash, entry) in self.contracts.drain() {
            match entry {
                Some(contract) => {
                    store.contracts.insert(hash, contract);
                }
                None => {
                    store.contracts.remove(&hash);
                }
            }
        }
        for (bytes, entry) in std::mem::take(&mut self.storages) {
            match entry {
                Some(item) => {
                    store.storages.insert(bytes, item);
                }
                None => {
                    store.storages.remove(&bytes);
                }
            }
        }
        Ok(())
    }
}
