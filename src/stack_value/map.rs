use std::sync::Arc;

use parking_lot::Mutex;

use super::list::next_container_id;
use super::StackValue;
use crate::error::{InteropError, InteropResult};

/// Shared, insertion-ordered key/value container.
///
/// Keys are restricted to non-container values; lookup uses structural
/// equality. Like [`super::ValueList`], cloning shares the underlying
/// storage.
#[derive(Debug, Clone)]
pub struct ValueMap {
    inner: Arc<Mutex<MapInner>>,
}

#[derive(Debug)]
struct MapInner {
    entries: Vec<(StackValue, StackValue)>,
    id: usize,
}

impl ValueMap {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MapInner {
                entries: Vec::new(),
                id: next_container_id(),
            })),
        }
    }

    /// Stable identity used for cycle detection and deep copies.
    #[must_use]
    pub fn id(&self) -> usize {
        self.inner.lock().id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Snapshot of the entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> Vec<(StackValue, StackValue)> {
        self.inner.lock().entries.clone()
    }

    #[must_use]
    pub fn get(&self, key: &StackValue) -> Option<StackValue> {
        self.inner
            .lock()
            .entries
            .iter()
            .find(|(k, _)| k.equals(key))
            .map(|(_, v)| v.clone())
    }

    #[must_use]
    pub fn contains_key(&self, key: &StackValue) -> bool {
        self.inner.lock().entries.iter().any(|(k, _)| k.equals(key))
    }

    /// Inserts or replaces the value for `key`, keeping the key's
    /// original position when it already exists.
    pub fn insert(&self, key: StackValue, value: StackValue) -> InteropResult<()> {
        if key.is_container() {
            return Err(InteropError::invalid_argument(
                "a non-container map key",
                key.kind_name(),
            ));
        }
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.entries.iter_mut().find(|(k, _)| k.equals(&key)) {
            entry.1 = value;
        } else {
            inner.entries.push((key, value));
        }
        Ok(())
    }

    /// Removes the entry for `key`, returning its value.
    pub fn remove(&self, key: &StackValue) -> Option<StackValue> {
        let mut inner = self.inner.lock();
        let index = inner.entries.iter().position(|(k, _)| k.equals(key))?;
        Some(inner.entries.remove(index).1)
    }

    /// Appends an entry without key validation or replacement. Callers
    /// must have established both themselves.
    pub(crate) fn push_entry(&self, key: StackValue, value: StackValue) {
        self.inner.lock().entries.push((key, value));
    }
}

impl Default for ValueMap {
    fn default() -> Self {
        Self::new()
    }
}
