//! `System.Runtime.*`: witness checks, notifications, logging, time
//! and value (de)serialization.

use num_bigint::BigInt;

use super::{pop, pop_bytes, push};
use crate::codec::BinarySerializer;
use crate::crypto;
use crate::engine::ScriptEngine;
use crate::error::InteropResult;
use crate::events::{self, LogEventArgs, NotifyEventArgs};
use crate::registry::InteropRegistry;
use crate::session::{Notification, ServiceSession};
use crate::stack_value::StackValue;
use crate::types::UInt160;

pub(super) fn register(registry: &mut InteropRegistry) {
    registry.register("System.Runtime.Platform", platform, Some(1));
    registry.register("System.Runtime.GetTrigger", get_trigger, Some(1));
    registry.register("System.Runtime.CheckWitness", check_witness, Some(200));
    registry.register("System.Runtime.Notify", notify, Some(1));
    registry.register("System.Runtime.Log", log, Some(1));
    registry.register("System.Runtime.GetTime", get_time, Some(1));
    registry.register("System.Runtime.Serialize", serialize, Some(1));
    registry.register("System.Runtime.Deserialize", deserialize, Some(1));
}

fn platform(_session: &mut ServiceSession, engine: &mut dyn ScriptEngine) -> InteropResult<()> {
    push(engine, StackValue::from_bytes(b"NEO".to_vec()));
    Ok(())
}

fn get_trigger(session: &mut ServiceSession, engine: &mut dyn ScriptEngine) -> InteropResult<()> {
    push(engine, StackValue::from_int(session.trigger() as u8));
    Ok(())
}

/// A 20-byte scalar is a script hash, a 33-byte scalar a compressed
/// secp256r1 key mapped through its single-signature redeem script.
/// Any other length observes `false`; an off-curve 33-byte encoding
/// faults.
fn check_witness(session: &mut ServiceSession, engine: &mut dyn ScriptEngine) -> InteropResult<()> {
    let data = pop_bytes(engine)?;
    let result = match data.len() {
        20 => {
            let hash = UInt160::from_slice(&data)?;
            witnessed_by(session, engine, &hash)
        }
        33 => {
            let hash = crypto::script_hash_of_pubkey(&data)?;
            witnessed_by(session, engine, &hash)
        }
        _ => false,
    };
    push(engine, StackValue::from_bool(result));
    Ok(())
}

fn witnessed_by(session: &ServiceSession, engine: &dyn ScriptEngine, hash: &UInt160) -> bool {
    engine
        .script_container()
        .map(|container| container.verifying_hashes(session.snapshot()).contains(hash))
        .unwrap_or(false)
}

/// Snapshots the popped value into the session's notification list and
/// fans it out to observers. Never fails once the argument is popped.
fn notify(session: &mut ServiceSession, engine: &mut dyn ScriptEngine) -> InteropResult<()> {
    let state = pop(engine)?.deep_copy();
    let container = engine.script_container();
    let script_hash = engine.current_script_hash();
    events::fire_notify(&NotifyEventArgs {
        container: container.clone(),
        script_hash,
        state: state.clone(),
    });
    session.push_notification(Notification {
        container,
        script_hash,
        state,
    });
    Ok(())
}

/// Interprets the popped bytes as UTF-8 (lossily) and fans the message
/// out to observers. Never fails once the argument is popped.
fn log(_session: &mut ServiceSession, engine: &mut dyn ScriptEngine) -> InteropResult<()> {
    let bytes = pop_bytes(engine)?;
    let message = String::from_utf8_lossy(&bytes).into_owned();
    let script_hash = engine.current_script_hash();
    tracing::info!(script = %script_hash, %message, "contract log");
    events::fire_log(&LogEventArgs {
        container: engine.script_container(),
        script_hash,
        message,
    });
    Ok(())
}

fn get_time(session: &mut ServiceSession, engine: &mut dyn ScriptEngine) -> InteropResult<()> {
    let timestamp = match session.snapshot().persisting_block() {
        Some(block) => block.header.timestamp,
        None => session.predicted_next_block_time(),
    };
    push(engine, StackValue::Integer(BigInt::from(timestamp)));
    Ok(())
}

fn serialize(_session: &mut ServiceSession, engine: &mut dyn ScriptEngine) -> InteropResult<()> {
    let value = pop(engine)?;
    let bytes = BinarySerializer::serialize(&value)?;
    push(engine, StackValue::from_bytes(bytes));
    Ok(())
}

fn deserialize(_session: &mut ServiceSession, engine: &mut dyn ScriptEngine) -> InteropResult<()> {
    let bytes = pop_bytes(engine)?;
    let value = BinarySerializer::deserialize(&bytes)?;
    push(engine, value);
    Ok(())
}
