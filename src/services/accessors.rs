//! `System.Header.*`, `System.Block.*` and `System.Transaction.*`:
//! attribute accessors over interop handles. Header accessors accept
//! both header and block handles.

use num_traits::ToPrimitive;

use super::{pop, pop_handle, push};
use crate::constants::MAX_ARRAY_SIZE;
use crate::engine::ScriptEngine;
use crate::error::{InteropError, InteropResult};
use crate::ledger::Header;
use crate::registry::InteropRegistry;
use crate::session::ServiceSession;
use crate::stack_value::{InteropHandle, StackValue, ValueList};

pub(super) fn register(registry: &mut InteropRegistry) {
    registry.register("System.Header.GetIndex", header_get_index, Some(1));
    registry.register("System.Header.GetHash", header_get_hash, Some(1));
    registry.register("System.Header.GetPrevHash", header_get_prev_hash, Some(1));
    registry.register("System.Header.GetTimestamp", header_get_timestamp, Some(1));
    registry.register(
        "System.Block.GetTransactionCount",
        block_get_transaction_count,
        Some(1),
    );
    registry.register("System.Block.GetTransactions", block_get_transactions, Some(1));
    registry.register("System.Block.GetTransaction", block_get_transaction, Some(1));
    registry.register("System.Transaction.GetHash", transaction_get_hash, Some(1));
}

fn with_header<T>(
    engine: &mut dyn ScriptEngine,
    read: impl FnOnce(&Header) -> T,
) -> InteropResult<T> {
    let handle = pop_handle(engine)?;
    Ok(read(handle.as_header()?))
}

fn header_get_index(
    _session: &mut ServiceSession,
    engine: &mut dyn ScriptEngine,
) -> InteropResult<()> {
    let index = with_header(engine, |header| header.index)?;
    push(engine, StackValue::from_int(index));
    Ok(())
}

fn header_get_hash(
    _session: &mut ServiceSession,
    engine: &mut dyn ScriptEngine,
) -> InteropResult<()> {
    let hash = with_header(engine, Header::hash)?;
    push(engine, StackValue::from_bytes(hash.to_vec()));
    Ok(())
}

fn header_get_prev_hash(
    _session: &mut ServiceSession,
    engine: &mut dyn ScriptEngine,
) -> InteropResult<()> {
    let hash = with_header(engine, |header| header.prev_hash)?;
    push(engine, StackValue::from_bytes(hash.to_vec()));
    Ok(())
}

fn header_get_timestamp(
    _session: &mut ServiceSession,
    engine: &mut dyn ScriptEngine,
) -> InteropResult<()> {
    let timestamp = with_header(engine, |header| header.timestamp)?;
    push(engine, StackValue::from_int(timestamp));
    Ok(())
}

fn block_get_transaction_count(
    _session: &mut ServiceSession,
    engine: &mut dyn ScriptEngine,
) -> InteropResult<()> {
    let handle = pop_handle(engine)?;
    let block = handle.as_block()?;
    push(engine, StackValue::from_int(block.transaction_count() as u64));
    Ok(())
}

fn block_get_transactions(
    _session: &mut ServiceSession,
    engine: &mut dyn ScriptEngine,
) -> InteropResult<()> {
    let handle = pop_handle(engine)?;
    let block = handle.as_block()?;
    if block.transaction_count() > MAX_ARRAY_SIZE {
        return Err(InteropError::TooManyItems {
            count: block.transaction_count(),
            limit: MAX_ARRAY_SIZE,
        });
    }
    let handles: Vec<StackValue> = block
        .transactions
        .iter()
        .map(|tx| StackValue::InteropHandle(InteropHandle::Transaction(std::sync::Arc::clone(tx))))
        .collect();
    push(engine, StackValue::Array(ValueList::new(handles)));
    Ok(())
}

fn block_get_transaction(
    _session: &mut ServiceSession,
    engine: &mut dyn ScriptEngine,
) -> InteropResult<()> {
    let handle = pop_handle(engine)?;
    let block = handle.as_block()?.clone();
    let index = pop(engine)?.to_bigint()?;
    let index = index.to_usize().ok_or_else(|| {
        InteropError::invalid_argument("a nonnegative transaction index", index.to_string())
    })?;
    let tx = block.transactions.get(index).ok_or_else(|| {
        InteropError::invalid_operation(format!(
            "transaction index {index} out of range ({} in block)",
            block.transaction_count()
        ))
    })?;
    push(
        engine,
        StackValue::InteropHandle(InteropHandle::Transaction(std::sync::Arc::clone(tx))),
    );
    Ok(())
}

fn transaction_get_hash(
    _session: &mut ServiceSession,
    engine: &mut dyn ScriptEngine,
) -> InteropResult<()> {
    let handle = pop_handle(engine)?;
    let tx = handle.as_transaction()?;
    push(engine, StackValue::from_bytes(tx.hash().to_vec()));
    Ok(())
}
