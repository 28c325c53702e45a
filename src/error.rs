//! Error types for the interop layer.
//!
//! Handlers surface the VM's binary ok/fail signal through
//! [`InteropError`]: a returned error faults the calling frame.

use thiserror::Error;

use crate::trigger::TriggerType;
use crate::types::UInt160;

/// Result alias used throughout the crate.
pub type InteropResult<T> = Result<T, InteropError>;

/// Failures produced by syscall handlers, the codec and the storage
/// namespace.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InteropError {
    /// Operation cannot be expressed at all (cycles, interop handles in
    /// a serialized stream, …).
    #[error("not supported: {reason}")]
    NotSupported { reason: String },

    /// Argument arity or type mismatch.
    #[error("invalid argument: expected {expected}, got {actual}")]
    InvalidArgument { expected: String, actual: String },

    /// Operation is meaningless in the current state.
    #[error("invalid operation: {reason}")]
    InvalidOperation { reason: String },

    /// Evaluation stack has fewer items than the handler needs.
    #[error("stack underflow: requested {requested} items, {available} available")]
    StackUnderflow { requested: usize, available: usize },

    /// Serialized form grew past the item size cap.
    #[error("item size {size} exceeds limit {limit}")]
    ItemTooLarge { size: usize, limit: usize },

    /// A container carries more elements than the per-header cap.
    #[error("container count {count} exceeds limit {limit}")]
    TooManyItems { count: usize, limit: usize },

    /// Byte stream cannot be decoded (bad tag, bad varint, …).
    #[error("malformed payload: {reason}")]
    Deformed { reason: String },

    /// Reader ran out of bytes.
    #[error("unexpected end of stream: {requested} more bytes required")]
    EndOfStream { requested: usize },

    /// Mutation attempted through a read-only storage context.
    #[error("storage context is read-only")]
    ReadOnlyContext,

    /// Storage key over the per-key byte cap.
    #[error("storage key length {len} exceeds {max}")]
    KeyTooLong { len: usize, max: usize },

    /// Storage-specific precondition failed (constant entry,
    /// storage-less contract, …).
    #[error("storage violation: {reason}")]
    StorageViolation { reason: String },

    /// No contract is deployed at the given hash.
    #[error("contract not found: {hash}")]
    ContractNotFound { hash: UInt160 },

    /// Handler requires an application-family trigger.
    #[error("operation requires an application trigger, current is {current:?}")]
    TriggerMismatch { current: TriggerType },

    /// Caller lacks the capability it tried to exercise.
    #[error("not authorized: {reason}")]
    NotAuthorized { reason: String },

    /// Gas budget cannot cover the syscall price (in 10⁻³ GAS).
    #[error("insufficient gas: required {required}, remaining {remaining}")]
    InsufficientGas { required: i64, remaining: i64 },

    /// Checked arithmetic overflowed.
    #[error("arithmetic overflow in {operation}")]
    Overflow { operation: String },
}

impl InteropError {
    pub fn not_supported(reason: impl Into<String>) -> Self {
        Self::NotSupported {
            reason: reason.into(),
        }
    }

    pub fn invalid_argument(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::InvalidArgument {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_operation(reason: impl Into<String>) -> Self {
        Self::InvalidOperation {
            reason: reason.into(),
        }
    }

    pub fn deformed(reason: impl Into<String>) -> Self {
        Self::Deformed {
            reason: reason.into(),
        }
    }

    pub fn storage_violation(reason: impl Into<String>) -> Self {
        Self::StorageViolation {
            reason: reason.into(),
        }
    }

    pub fn not_authorized(reason: impl Into<String>) -> Self {
        Self::NotAuthorized {
            reason: reason.into(),
        }
    }

    pub fn overflow(operation: impl Into<String>) -> Self {
        Self::Overflow {
            operation: operation.into(),
        }
    }
}
