//! Opaque handle table for objects shared across a foreign-call boundary.

use std::collections::BTreeMap;
use std::sync::Arc;

/// Opaque handle value. `0` is never issued.
pub type Handle = u64;

/// Maps integer handles to shared objects until explicitly released.
#[derive(Debug)]
pub struct HandleTable<T: ?Sized> {
    next: Handle,
    entries: BTreeMap<Handle, Arc<T>>,
}

impl<T: ?Sized> HandleTable<T> {
    pub fn new() -> Self {
        Self {
            next: 1,
            entries: BTreeMap::new(),
        }
    }

    /// Stores one object and returns its handle.
    pub fn insert(&mut self, value: Arc<T>) -> Handle {
        let handle = self.next;
        self.next += 1;
        self.entries.insert(handle, value);
        handle
    }

    /// Returns a new strong reference for a live handle.
    pub fn get(&self, handle: Handle) -> Option<Arc<T>> {
        self.entries.get(&handle).cloned()
    }

    /// Unbinds one handle. Outstanding `Arc`s stay valid.
    pub fn release(&mut self, handle: Handle) -> Option<Arc<T>> {
        self.entries.remove(&handle)
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.entries.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: ?Sized> Default for HandleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
