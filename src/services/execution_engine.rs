//! `System.ExecutionEngine.*`: introspection of the executing frames.

use super::push;
use crate::engine::ScriptEngine;
use crate::error::{InteropError, InteropResult};
use crate::registry::InteropRegistry;
use crate::session::ServiceSession;
use crate::stack_value::StackValue;

pub(super) fn register(registry: &mut InteropRegistry) {
    registry.register(
        "System.ExecutionEngine.GetScriptContainer",
        get_script_container,
        Some(1),
    );
    registry.register(
        "System.ExecutionEngine.GetExecutingScriptHash",
        get_executing_script_hash,
        Some(1),
    );
    registry.register(
        "System.ExecutionEngine.GetCallingScriptHash",
        get_calling_script_hash,
        Some(1),
    );
    registry.register(
        "System.ExecutionEngine.GetEntryScriptHash",
        get_entry_script_hash,
        Some(1),
    );
}

fn get_script_container(
    _session: &mut ServiceSession,
    engine: &mut dyn ScriptEngine,
) -> InteropResult<()> {
    let container = engine.script_container().ok_or_else(|| {
        InteropError::invalid_operation("no script container bound to this execution")
    })?;
    push(engine, StackValue::InteropHandle(container.to_handle()));
    Ok(())
}

fn get_executing_script_hash(
    _session: &mut ServiceSession,
    engine: &mut dyn ScriptEngine,
) -> InteropResult<()> {
    let hash = engine.current_script_hash();
    push(engine, StackValue::from_bytes(hash.to_vec()));
    Ok(())
}

fn get_calling_script_hash(
    _session: &mut ServiceSession,
    engine: &mut dyn ScriptEngine,
) -> InteropResult<()> {
    // Entry frames have no caller; they observe an empty byte string.
    let bytes = engine
        .calling_script_hash()
        .map(|hash| hash.to_vec())
        .unwrap_or_default();
    push(engine, StackValue::from_bytes(bytes));
    Ok(())
}

fn get_entry_script_hash(
    _session: &mut ServiceSession,
    engine: &mut dyn ScriptEngine,
) -> InteropResult<()> {
    let hash = engine.entry_script_hash();
    push(engine, StackValue::from_bytes(hash.to_vec()));
    Ok(())
}
