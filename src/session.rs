//! Per-execution service session.

use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::ScriptEngine;
use crate::error::InteropResult;
use crate::gas::{self, GasMeter};
use crate::ledger::ScriptContainer;
use crate::registry::InteropRegistry;
use crate::services;
use crate::settings::ProtocolSettings;
use crate::snapshot::Snapshot;
use crate::stack_value::StackValue;
use crate::trigger::TriggerType;
use crate::types::UInt160;

/// Resource released when the session is disposed, e.g. an enumerator
/// over a storage scan.
pub trait Disposable {
    fn dispose(&mut self);
}

/// Event recorded by `Runtime.Notify`; the list preserves handler
/// invocation order for external observers.
#[derive(Debug, Clone)]
pub struct Notification {
    pub container: Option<Arc<ScriptContainer>>,
    pub script_hash: UInt160,
    pub state: StackValue,
}

/// Context for one VM execution: the trigger it runs under, exclusive
/// ownership of a snapshot, the accumulated notifications, the
/// created-contract provenance table and the held disposables.
pub struct ServiceSession {
    trigger: TriggerType,
    snapshot: Box<dyn Snapshot>,
    settings: ProtocolSettings,
    registry: InteropRegistry,
    notifications: Vec<Notification>,
    contracts_created: HashMap<UInt160, UInt160>,
    disposables: Vec<Box<dyn Disposable>>,
    disposed: bool,
}

impl ServiceSession {
    pub fn new(trigger: TriggerType, snapshot: Box<dyn Snapshot>) -> Self {
        Self::with_settings(trigger, snapshot, ProtocolSettings::default())
    }

    pub fn with_settings(
        trigger: TriggerType,
        snapshot: Box<dyn Snapshot>,
        settings: ProtocolSettings,
    ) -> Self {
        let mut registry = InteropRegistry::new();
        services::register_all(&mut registry);
        Self {
            trigger,
            snapshot,
            settings,
            registry,
            notifications: Vec::new(),
            contracts_created: HashMap::new(),
            disposables: Vec::new(),
            disposed: false,
        }
    }

    pub fn trigger(&self) -> TriggerType {
        self.trigger
    }

    pub fn settings(&self) -> &ProtocolSettings {
        &self.settings
    }

    pub fn snapshot(&self) -> &dyn Snapshot {
        self.snapshot.as_ref()
    }

    pub fn snapshot_mut(&mut self) -> &mut dyn Snapshot {
        self.snapshot.as_mut()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub(crate) fn push_notification(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    /// Records that `creator` deployed `contract` during this session.
    /// This is the seam the deployment machinery feeds; the table gates
    /// `Contract.GetStorageContext`.
    pub fn note_contract_created(&mut self, contract: UInt160, creator: UInt160) {
        self.contracts_created.insert(contract, creator);
    }

    /// The recorded creator of `contract`, if it was deployed in this
    /// session.
    pub fn created_by(&self, contract: &UInt160) -> Option<UInt160> {
        self.contracts_created.get(contract).copied()
    }

    /// Hands a resource to the session; it is released on dispose in
    /// registration order.
    pub fn add_disposable(&mut self, disposable: Box<dyn Disposable>) {
        self.disposables.push(disposable);
    }

    /// Timestamp `Runtime.GetTime` reports when no block is being
    /// persisted: the best header's timestamp plus the block cadence.
    /// The value is fully predictable from public chain state, so
    /// miners can steer it within one block interval; the behavior is
    /// kept for consensus compatibility.
    pub fn predicted_next_block_time(&self) -> u32 {
        let base = self
            .snapshot
            .current_header()
            .map(|header| header.timestamp)
            .unwrap_or(0);
        base.wrapping_add(self.settings.seconds_per_block)
    }

    /// Price of `method` in 10⁻³ GAS, resolving dynamic prices against
    /// the arguments currently on the evaluation stack. Unknown
    /// methods price at zero.
    pub fn price_of(&self, engine: &dyn ScriptEngine, method: &[u8]) -> InteropResult<i64> {
        match self.registry.resolve(method) {
            None => Ok(0),
            Some(descriptor) => match descriptor.price {
                Some(price) => Ok(price),
                None => dynamic_price(descriptor.name, engine),
            },
        }
    }

    /// Dispatches a syscall: resolves the method, deducts its price
    /// from `meter` and runs the handler. Returns `Ok(false)` when the
    /// method is unknown (the VM faults), and propagates the handler's
    /// result unchanged otherwise.
    pub fn invoke(
        &mut self,
        engine: &mut dyn ScriptEngine,
        method: &[u8],
        meter: &mut GasMeter,
    ) -> InteropResult<bool> {
        let descriptor = match self.registry.resolve(method) {
            Some(descriptor) => descriptor.clone(),
            None => {
                tracing::debug!(method = %String::from_utf8_lossy(method), "unknown interop method");
                return Ok(false);
            }
        };
        let price = match descriptor.price {
            Some(price) => price,
            None => dynamic_price(descriptor.name, &*engine)?,
        };
        meter.consume_milli(price)?;
        tracing::trace!(method = descriptor.name, price, "dispatching syscall");
        (descriptor.handler)(self, engine)?;
        Ok(true)
    }

    /// Flushes the snapshot to the durable store.
    pub fn commit(&mut self) -> InteropResult<()> {
        self.snapshot.commit()
    }

    /// Releases every held resource in registration order. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        for disposable in &mut self.disposables {
            disposable.dispose();
        }
        self.disposables.clear();
    }
}

impl Drop for ServiceSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Prices computed from pending stack arguments rather than the
/// registry. `Storage.Put` charges per started KiB of key plus value.
fn dynamic_price(name: &str, engine: &dyn ScriptEngine) -> InteropResult<i64> {
    match name {
        "System.Storage.Put" | "System.Storage.PutEx" => {
            let key = engine.evaluation_stack().peek(1)?.to_bytes()?;
            let value = engine.evaluation_stack().peek(2)?.to_bytes()?;
            Ok(gas::storage_put_price(key.len(), value.len()))
        }
        _ => Ok(0),
    }
}
