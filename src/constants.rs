//! Limits shared by the codec, the storage namespace and the syscall
//! handlers. These values are consensus-visible: changing any of them
//! changes which scripts fault.

/// Maximum byte length of a serialized stack value.
pub const MAX_ITEM_SIZE: usize = 1024 * 1024;

/// Maximum element count accepted for a single container header.
pub const MAX_ARRAY_SIZE: usize = 1024;

/// Maximum byte length of a contract storage key.
pub const MAX_STORAGE_KEY_SIZE: usize = 1024;

/// Target seconds between two blocks, used by `Runtime.GetTime` when no
/// block is being persisted.
pub const SECONDS_PER_BLOCK: u32 = 15;
