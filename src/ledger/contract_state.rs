use once_cell::sync::OnceCell;

use crate::crypto;
use crate::types::UInt160;

/// Record of a deployed contract. The script hash is derived from the
/// script itself and cached after first use.
#[derive(Debug, Clone, Default)]
pub struct ContractState {
    pub script: Vec<u8>,
    pub has_storage: bool,
    pub name: String,
    pub code_version: String,
    pub author: String,
    pub email: String,
    pub description: String,
    script_hash: OnceCell<UInt160>,
}

impl ContractState {
    pub fn new(script: Vec<u8>, has_storage: bool) -> Self {
        Self {
            script,
            has_storage,
            ..Self::default()
        }
    }

    pub fn script_hash(&self) -> UInt160 {
        *self
            .script_hash
            .get_or_init(|| crypto::hash160(&self.script))
    }
}
