//! Process-wide observer registry for `Runtime.Notify` and
//! `Runtime.Log`.
//!
//! Dispatch is synchronous and fire-and-forget: a panicking subscriber
//! is logged and discarded so off-chain observers can never influence
//! consensus.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::RwLock;

use crate::ledger::ScriptContainer;
use crate::stack_value::StackValue;
use crate::types::UInt160;

/// Payload handed to notify observers.
#[derive(Debug, Clone)]
pub struct NotifyEventArgs {
    pub container: Option<Arc<ScriptContainer>>,
    pub script_hash: UInt160,
    pub state: StackValue,
}

/// Payload handed to log observers.
#[derive(Debug, Clone)]
pub struct LogEventArgs {
    pub container: Option<Arc<ScriptContainer>>,
    pub script_hash: UInt160,
    pub message: String,
}

/// Token returned by the subscribe functions.
pub type SubscriptionId = u64;

type NotifyObserver = Arc<dyn Fn(&NotifyEventArgs) + Send + Sync>;
type LogObserver = Arc<dyn Fn(&LogEventArgs) + Send + Sync>;

lazy_static! {
    static ref NOTIFY_OBSERVERS: RwLock<Vec<(SubscriptionId, NotifyObserver)>> =
        RwLock::new(Vec::new());
    static ref LOG_OBSERVERS: RwLock<Vec<(SubscriptionId, LogObserver)>> = RwLock::new(Vec::new());
}

static NEXT_SUBSCRIPTION: AtomicU64 = AtomicU64::new(1);

fn next_subscription() -> SubscriptionId {
    NEXT_SUBSCRIPTION.fetch_add(1, Ordering::Relaxed)
}

pub fn subscribe_notify(
    observer: impl Fn(&NotifyEventArgs) + Send + Sync + 'static,
) -> SubscriptionId {
    let id = next_subscription();
    NOTIFY_OBSERVERS.write().push((id, Arc::new(observer)));
    id
}

pub fn unsubscribe_notify(id: SubscriptionId) {
    NOTIFY_OBSERVERS.write().retain(|(sub, _)| *sub != id);
}

pub fn subscribe_log(observer: impl Fn(&LogEventArgs) + Send + Sync + 'static) -> SubscriptionId {
    let id = next_subscription();
    LOG_OBSERVERS.write().push((id, Arc::new(observer)));
    id
}

pub fn unsubscribe_log(id: SubscriptionId) {
    LOG_OBSERVERS.write().retain(|(sub, _)| *sub != id);
}

pub(crate) fn fire_notify(args: &NotifyEventArgs) {
    let observers = NOTIFY_OBSERVERS.read().clone();
    for (id, observer) in observers {
        if catch_unwind(AssertUnwindSafe(|| observer(args))).is_err() {
            tracing::warn!(subscription = id, "notify observer panicked; ignoring");
        }
    }
}

pub(crate) fn fire_log(args: &LogEventArgs) {
    let observers = LOG_OBSERVERS.read().clone();
    for (id, observer) in observers {
        if catch_unwind(AssertUnwindSafe(|| observer(args))).is_err() {
            tracing::warn!(subscription = id, "log observer panicked; ignoring");
        }
    }
}
