//! `System.Blockchain.*`: chain queries by height or hash. Queries
//! push an interop handle on a hit and an empty byte string on a miss.

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};

use super::{pop_bytes, push};
use crate::engine::ScriptEngine;
use crate::error::{InteropError, InteropResult};
use crate::registry::InteropRegistry;
use crate::session::ServiceSession;
use crate::stack_value::{bigint_from_bytes, InteropHandle, StackValue};
use crate::types::{UInt160, UInt256};

pub(super) fn register(registry: &mut InteropRegistry) {
    registry.register("System.Blockchain.GetHeight", get_height, Some(1));
    registry.register("System.Blockchain.GetHeader", get_header, Some(100));
    registry.register("System.Blockchain.GetBlock", get_block, Some(200));
    registry.register("System.Blockchain.GetTransaction", get_transaction, Some(200));
    registry.register(
        "System.Blockchain.GetTransactionHeight",
        get_transaction_height,
        Some(100),
    );
    registry.register("System.Blockchain.GetContract", get_contract, Some(100));
}

fn get_height(session: &mut ServiceSession, engine: &mut dyn ScriptEngine) -> InteropResult<()> {
    push(engine, StackValue::from_int(session.snapshot().height()));
    Ok(())
}

/// A payload of up to five bytes is a nonnegative height mapped to the
/// canonical hash at that height; 32 bytes are a hash directly.
fn resolve_block_hash(
    session: &ServiceSession,
    data: &[u8],
) -> InteropResult<Option<UInt256>> {
    match data.len() {
        0..=5 => {
            let height = bigint_from_bytes(data);
            if height.is_negative() {
                return Err(InteropError::invalid_argument(
                    "a nonnegative block height",
                    height.to_string(),
                ));
            }
            let Some(height) = height.to_u32() else {
                return Err(InteropError::invalid_argument(
                    "a block height within the chain's range",
                    height.to_string(),
                ));
            };
            Ok(session.snapshot().header_hash_at(height))
        }
        32 => Ok(Some(UInt256::from_slice(data)?)),
        len => Err(InteropError::invalid_argument(
            "a block height or 32-byte hash",
            format!("{len} bytes"),
        )),
    }
}

fn get_header(session: &mut ServiceSession, engine: &mut dyn ScriptEngine) -> InteropResult<()> {
    let data = pop_bytes(engine)?;
    let header = resolve_block_hash(session, &data)?
        .and_then(|hash| session.snapshot().header(&hash));
    match header {
        Some(header) => push(engine, StackValue::InteropHandle(InteropHandle::Header(header))),
        None => push(engine, StackValue::from_bytes(Vec::new())),
    }
    Ok(())
}

fn get_block(session: &mut ServiceSession, engine: &mut dyn ScriptEngine) -> InteropResult<()> {
    let data = pop_bytes(engine)?;
    let block = resolve_block_hash(session, &data)?
        .and_then(|hash| session.snapshot().block(&hash));
    match block {
        Some(block) => push(engine, StackValue::InteropHandle(InteropHandle::Block(block))),
        None => push(engine, StackValue::from_bytes(Vec::new())),
    }
    Ok(())
}

fn get_transaction(
    session: &mut ServiceSession,
    engine: &mut dyn ScriptEngine,
) -> InteropResult<()> {
    let data = pop_bytes(engine)?;
    let hash = UInt256::from_slice(&data)?;
    match session.snapshot().transaction(&hash) {
        Some(tx) => push(engine, StackValue::InteropHandle(InteropHandle::Transaction(tx))),
        None => push(engine, StackValue::from_bytes(Vec::new())),
    }
    Ok(())
}

fn get_transaction_height(
    session: &mut ServiceSession,
    engine: &mut dyn ScriptEngine,
) -> InteropResult<()> {
    let data = pop_bytes(engine)?;
    let hash = UInt256::from_slice(&data)?;
    let height = session
        .snapshot()
        .transaction_height(&hash)
        .map(BigInt::from)
        .unwrap_or_else(|| BigInt::from(-1));
    push(engine, StackValue::Integer(height));
    Ok(())
}

fn get_contract(session: &mut ServiceSession, engine: &mut dyn ScriptEngine) -> InteropResult<()> {
    let data = pop_bytes(engine)?;
    let hash = UInt160::from_slice(&data)?;
    match session.snapshot().contract(&hash) {
        Some(contract) => push(
            engine,
            StackValue::InteropHandle(InteropHandle::Contract(std::sync::Arc::new(contract))),
        ),
        None => push(engine, StackValue::from_bytes(Vec::new())),
    }
    Ok(())
}
