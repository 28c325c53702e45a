//! Smart-contract interoperability layer for a UTXO-plus-account
//! blockchain node.
//!
//! This crate is the bridge between a stack-based VM executing
//! contract bytecode and the node's persistent ledger state. It
//! provides:
//!
//! * the tagged [`StackValue`](stack_value::StackValue) universe and
//!   its deterministic binary codec ([`codec::BinarySerializer`]),
//! * the contract storage namespace with capability-style
//!   [`StorageContext`](storage::StorageContext)s,
//! * the [`Snapshot`](snapshot::Snapshot) façade over ledger state,
//! * the syscall registry and the `System.*` service catalogue,
//! * the per-execution [`ServiceSession`](session::ServiceSession).
//!
//! Three invariants carried here are consensus-critical: exact gas
//! pricing per syscall, byte-identical serialization of stack values
//! across nodes, and the permission rules deciding which script may
//! mutate which storage partition.
//!
//! The VM itself, networking, consensus and the concrete key-value
//! store are external collaborators reached through the
//! [`ScriptEngine`](engine::ScriptEngine) and
//! [`Snapshot`](snapshot::Snapshot) seams.

pub mod codec;
pub mod constants;
pub mod crypto;
pub mod engine;
pub mod error;
pub mod events;
pub mod gas;
pub mod io;
pub mod ledger;
pub mod registry;
mod services;
pub mod session;
pub mod settings;
pub mod snapshot;
pub mod stack_value;
pub mod storage;
pub mod trigger;
pub mod types;

pub use codec::BinarySerializer;
pub use engine::{EvaluationStack, ScriptEngine};
pub use error::{InteropError, InteropResult};
pub use gas::GasMeter;
pub use registry::{method_id, InteropRegistry};
pub use session::{Disposable, Notification, ServiceSession};
pub use settings::ProtocolSettings;
pub use snapshot::{MemorySnapshot, MemoryStore, SharedStore, Snapshot};
pub use stack_value::{InteropHandle, StackValue, ValueKind, ValueList, ValueMap};
pub use storage::{StorageContext, StorageFlags, StorageItem, StorageKey};
pub use trigger::TriggerType;
pub use types::{Fixed8, UInt160, UInt256};
