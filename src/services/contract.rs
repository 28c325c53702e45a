//! `System.Contract.*`: lifecycle operations available to a running
//! script.

use super::{pop_handle, push};
use crate::engine::ScriptEngine;
use crate::error::{InteropError, InteropResult};
use crate::registry::InteropRegistry;
use crate::session::ServiceSession;
use crate::stack_value::{InteropHandle, StackValue};
use crate::storage::StorageContext;

pub(super) fn register(registry: &mut InteropRegistry) {
    registry.register("System.Contract.Destroy", destroy, Some(1));
    registry.register(
        "System.Contract.GetStorageContext",
        get_storage_context,
        Some(1),
    );
}

/// Removes the executing contract's record and purges its storage
/// partition. A script without a deployed record is a no-op.
fn destroy(session: &mut ServiceSession, engine: &mut dyn ScriptEngine) -> InteropResult<()> {
    if !session.trigger().is_application() {
        return Err(InteropError::TriggerMismatch {
            current: session.trigger(),
        });
    }
    let hash = engine.current_script_hash();
    let Some(contract) = session.snapshot().contract(&hash) else {
        return Ok(());
    };
    session.snapshot_mut().delete_contract(&hash);
    if contract.has_storage {
        for (key, _) in session.snapshot().storage_find(hash.as_le_bytes()) {
            session.snapshot_mut().storage_delete(&key);
        }
    }
    tracing::debug!(contract = %hash, "contract destroyed");
    Ok(())
}

/// Grants a writable context over another contract's partition —
/// but only to the script recorded as that contract's creator. This is
/// the sole channel for cross-contract storage mutation.
fn get_storage_context(
    session: &mut ServiceSession,
    engine: &mut dyn ScriptEngine,
) -> InteropResult<()> {
    let handle = pop_handle(engine)?;
    let contract = handle.as_contract()?;
    let contract_hash = contract.script_hash();
    match session.created_by(&contract_hash) {
        Some(creator) if creator == engine.current_script_hash() => {
            push(
                engine,
                StackValue::InteropHandle(InteropHandle::StorageContext(StorageContext::new(
                    contract_hash,
                ))),
            );
            Ok(())
        }
        _ => Err(InteropError::not_authorized(
            "storage context is granted only to the contract's creator",
        )),
    }
}
