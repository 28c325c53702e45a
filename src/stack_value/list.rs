use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::StackValue;

static NEXT_CONTAINER_ID: AtomicUsize = AtomicUsize::new(1);

/// Allocates a process-unique container identity. Identities mimic
/// reference equality: two containers are the same object iff their
/// ids match.
pub(crate) fn next_container_id() -> usize {
    NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed)
}

/// Shared, ordered container backing both `Array` and `Struct` values.
///
/// Cloning a `ValueList` clones the handle, not the contents; mutation
/// through any clone is visible through all of them, which is what lets
/// scripts build cyclic structures.
#[derive(Debug, Clone)]
pub struct ValueList {
    inner: Arc<Mutex<ListInner>>,
}

#[derive(Debug)]
struct ListInner {
    items: Vec<StackValue>,
    id: usize,
}

impl ValueList {
    pub fn new(items: Vec<StackValue>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ListInner {
                items,
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
        self.inner.lock().items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    /// Snapshot of the current elements. Container elements are shared
    /// handles, so the snapshot is shallow.
    #[must_use]
    pub fn items(&self) -> Vec<StackValue> {
        self.inner.lock().items.clone()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<StackValue> {
        self.inner.lock().items.get(index).cloned()
    }

    pub fn push(&self, item: StackValue) {
        self.inner.lock().items.push(item);
    }

    pub fn set(&self, index: usize, item: StackValue) -> Result<(), crate::error::InteropError> {
        let mut inner = self.inner.lock();
        if index >= inner.items.len() {
            return Err(crate::error::InteropError::invalid_operation(format!(
                "index {index} out of range"
            )));
        }
        inner.items[index] = item;
        Ok(())
    }

    pub fn clear(&self) {
        self.inner.lock().items.clear();
    }
}

impl From<Vec<StackValue>> for ValueList {
    fn from(items: Vec<StackValue>) -> Self {
        Self::new(items)
    }
}

impl Default for ValueList {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
