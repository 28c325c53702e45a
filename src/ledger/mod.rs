//! Minimal ledger model served through the syscall surface: headers,
//! blocks, transactions and deployed-contract records, plus the script
//! container seam that authorizes an execution.

mod block;
mod container;
mod contract_state;
mod header;
mod transaction;

pub use block::Block;
pub use container::ScriptContainer;
pub use contract_state::ContractState;
pub use header::Header;
pub use transaction::{
    CoinReference, Transaction, TransactionAttribute, TransactionOutput, TransactionType, Witness,
};
