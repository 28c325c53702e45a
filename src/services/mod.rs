//! The syscall catalogue. Each submodule registers one `System.*`
//! namespace; handlers pop their arguments from the evaluation stack,
//! consult the session's snapshot and push results back.

mod accessors;
mod blockchain;
mod contract;
mod execution_engine;
mod runtime;
mod storage;

use crate::engine::ScriptEngine;
use crate::error::InteropResult;
use crate::registry::InteropRegistry;
use crate::stack_value::{InteropHandle, StackValue};

/// Registers the full service surface with its gas prices.
pub(crate) fn register_all(registry: &mut InteropRegistry) {
    execution_engine::register(registry);
    runtime::register(registry);
    blockchain::register(registry);
    accessors::register(registry);
    contract::register(registry);
    storage::register(registry);
}

fn pop(engine: &mut dyn ScriptEngine) -> InteropResult<StackValue> {
    engine.evaluation_stack_mut().pop()
}

fn pop_bytes(engine: &mut dyn ScriptEngine) -> InteropResult<Vec<u8>> {
    pop(engine)?.to_bytes()
}

fn pop_handle(engine: &mut dyn ScriptEngine) -> InteropResult<InteropHandle> {
    let value = pop(engine)?;
    value.as_handle().cloned()
}

fn push(engine: &mut dyn ScriptEngine, value: StackValue) {
    engine.evaluation_stack_mut().push(value);
}
