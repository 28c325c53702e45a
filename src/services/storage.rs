//! `System.Storage.*` and `System.StorageContext.*`: the contract
//! storage surface.

use num_traits::ToPrimitive;

use super::{pop, pop_bytes, pop_handle, push};
use crate::constants::MAX_STORAGE_KEY_SIZE;
use crate::engine::ScriptEngine;
use crate::error::{InteropError, InteropResult};
use crate::registry::InteropRegistry;
use crate::session::ServiceSession;
use crate::stack_value::{InteropHandle, StackValue};
use crate::storage::{StorageContext, StorageFlags, StorageItem, StorageKey};

pub(super) fn register(registry: &mut InteropRegistry) {
    registry.register("System.Storage.GetContext", get_context, Some(1));
    registry.register(
        "System.Storage.GetReadOnlyContext",
        get_read_only_context,
        Some(1),
    );
    registry.register("System.Storage.Get", get, Some(100));
    registry.register("System.Storage.Put", put, None);
    registry.register("System.Storage.PutEx", put_ex, None);
    registry.register("System.Storage.Delete", delete, Some(100));
    registry.register("System.StorageContext.AsReadOnly", as_read_only, Some(1));
}

fn get_context(_session: &mut ServiceSession, engine: &mut dyn ScriptEngine) -> InteropResult<()> {
    let context = StorageContext::new(engine.current_script_hash());
    push(engine, StackValue::InteropHandle(InteropHandle::StorageContext(context)));
    Ok(())
}

fn get_read_only_context(
    _session: &mut ServiceSession,
    engine: &mut dyn ScriptEngine,
) -> InteropResult<()> {
    let context = StorageContext::new(engine.current_script_hash()).as_read_only();
    push(engine, StackValue::InteropHandle(InteropHandle::StorageContext(context)));
    Ok(())
}

fn as_read_only(_session: &mut ServiceSession, engine: &mut dyn ScriptEngine) -> InteropResult<()> {
    let context = pop_context(engine)?;
    push(
        engine,
        StackValue::InteropHandle(InteropHandle::StorageContext(context.as_read_only())),
    );
    Ok(())
}

fn pop_context(engine: &mut dyn ScriptEngine) -> InteropResult<StorageContext> {
    pop_handle(engine)?.as_storage_context()
}

/// The partition behind `context` must belong to a deployed contract
/// that was granted storage.
fn check_storage_context(session: &ServiceSession, context: &StorageContext) -> InteropResult<()> {
    let contract = session
        .snapshot()
        .contract(&context.script_hash)
        .ok_or(InteropError::ContractNotFound {
            hash: context.script_hash,
        })?;
    if !contract.has_storage {
        return Err(InteropError::storage_violation(
            "contract has no storage partition",
        ));
    }
    Ok(())
}

fn require_application_trigger(session: &ServiceSession) -> InteropResult<()> {
    if !session.trigger().is_application() {
        return Err(InteropError::TriggerMismatch {
            current: session.trigger(),
        });
    }
    Ok(())
}

/// Read-only contexts are accepted; a missing entry observes the
/// empty byte string.
fn get(session: &mut ServiceSession, engine: &mut dyn ScriptEngine) -> InteropResult<()> {
    let context = pop_context(engine)?;
    let key = pop_bytes(engine)?;
    check_storage_context(session, &context)?;
    let value = session
        .snapshot()
        .storage_get(&StorageKey::new(context.script_hash, key))
        .map(|item| item.value)
        .unwrap_or_default();
    push(engine, StackValue::from_bytes(value));
    Ok(())
}

fn put(session: &mut ServiceSession, engine: &mut dyn ScriptEngine) -> InteropResult<()> {
    let context = pop_context(engine)?;
    let key = pop_bytes(engine)?;
    let value = pop_bytes(engine)?;
    put_inner(session, context, key, value, StorageFlags::empty())
}

fn put_ex(session: &mut ServiceSession, engine: &mut dyn ScriptEngine) -> InteropResult<()> {
    let context = pop_context(engine)?;
    let key = pop_bytes(engine)?;
    let value = pop_bytes(engine)?;
    let raw_flags = pop(engine)?.to_bigint()?;
    let raw_flags = raw_flags.to_u8().ok_or_else(|| {
        InteropError::invalid_argument("storage flags", raw_flags.to_string())
    })?;
    let flags = StorageFlags::from_bits(raw_flags).ok_or_else(|| {
        InteropError::invalid_argument("storage flags", format!("{raw_flags:#04x}"))
    })?;
    put_inner(session, context, key, value, flags)
}

fn put_inner(
    session: &mut ServiceSession,
    context: StorageContext,
    key: Vec<u8>,
    value: Vec<u8>,
    flags: StorageFlags,
) -> InteropResult<()> {
    require_application_trigger(session)?;
    if key.len() > MAX_STORAGE_KEY_SIZE {
        return Err(InteropError::KeyTooLong {
            len: key.len(),
            max: MAX_STORAGE_KEY_SIZE,
        });
    }
    if context.read_only {
        return Err(InteropError::ReadOnlyContext);
    }
    check_storage_context(session, &context)?;
    let storage_key = StorageKey::new(context.script_hash, key);
    if let Some(existing) = session.snapshot().storage_get(&storage_key) {
        if existing.is_constant {
            return Err(InteropError::storage_violation(
                "entry is constant and cannot be rewritten",
            ));
        }
    }
    tracing::trace!(
        contract = %context.script_hash,
        key_len = storage_key.key.len(),
        value_len = value.len(),
        "storage put"
    );
    session
        .snapshot_mut()
        .storage_put(storage_key, StorageItem::new(value, flags.contains(StorageFlags::CONSTANT)));
    Ok(())
}

fn delete(session: &mut ServiceSession, engine: &mut dyn ScriptEngine) -> InteropResult<()> {
    let context = pop_context(engine)?;
    let key = pop_bytes(engine)?;
    require_application_trigger(session)?;
    if key.len() > MAX_STORAGE_KEY_SIZE {
        return Err(InteropError::KeyTooLong {
            len: key.len(),
            max: MAX_STORAGE_KEY_SIZE,
        });
    }
    if context.read_only {
        return Err(InteropError::ReadOnlyContext);
    }
    check_storage_context(session, &context)?;
    let storage_key = StorageKey::new(context.script_hash, key);
    if let Some(existing) = session.snapshot().storage_get(&storage_key) {
        if existing.is_constant {
            return Err(InteropError::storage_violation(
                "entry is constant and cannot be deleted",
            ));
        }
    }
    tracing::trace!(contract = %context.script_hash, "storage delete");
    session.snapshot_mut().storage_delete(&storage_key);
    Ok(())
}
