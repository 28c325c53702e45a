//! The interop registry: maps 32-bit method identifiers to handlers
//! and gas prices.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use crate::engine::ScriptEngine;
use crate::error::InteropResult;
use crate::session::ServiceSession;

/// A syscall handler. Returning an error is the "fail" half of the
/// VM's ok/fail signal and faults the calling frame.
pub type ServiceHandler = fn(&mut ServiceSession, &mut dyn ScriptEngine) -> InteropResult<()>;

/// Computes the method identifier for a service name: the first four
/// bytes of the SHA-256 of its ASCII encoding, read little-endian.
pub fn method_id(name: &[u8]) -> u32 {
    let digest = Sha256::digest(name);
    u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// Registration record for one syscall.
#[derive(Debug, Clone)]
pub struct InteropDescriptor {
    pub name: &'static str,

    pub handler: ServiceHandler,

    /// Fixed price in 10⁻³ GAS; `None` marks a dynamic price computed
    /// from the handler's pending arguments.
    pub price: Option<i64>,
}

/// Lookup table from method identifier to descriptor.
#[derive(Debug, Default)]
pub struct InteropRegistry {
    methods: HashMap<u32, InteropDescriptor>,
}

impl InteropRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn register(&mut self, name: &'static str, handler: ServiceHandler, price: Option<i64>) {
        let id = method_id(name.as_bytes());
        let replaced = self.methods.insert(
            id,
            InteropDescriptor {
                name,
                handler,
                price,
            },
        );
        debug_assert!(replaced.is_none(), "method id collision for {name}");
    }

    /// Resolves raw method bytes: exactly four bytes are taken as the
    /// identifier itself, anything else is hashed first.
    pub fn resolve(&self, method: &[u8]) -> Option<&InteropDescriptor> {
        let id = if method.len() == 4 {
            u32::from_le_bytes([method[0], method[1], method[2], method[3]])
        } else {
            method_id(method)
        };
        self.methods.get(&id)
    }

    pub fn get(&self, id: u32) -> Option<&InteropDescriptor> {
        self.methods.get(&id)
    }
}
