//! Non-owning references to host-owned objects.

use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Weak};

/// Weak handle to an object whose identity belongs to the host.
///
/// The core never keeps the host object alive. Each use acquires a scoped
/// strong reference and releases it when the call returns.
pub struct HostRef<T: ?Sized> {
    inner: Weak<T>,
}

impl<T: ?Sized> HostRef<T> {
    pub fn new(target: &Arc<T>) -> Self {
        Self {
            inner: Arc::downgrade(target),
        }
    }

    /// Runs `f` against the live host object, or returns `None` when the host
    /// already dropped it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let target = self.inner.upgrade()?;
        Some(f(&target))
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl<T: ?Sized> Clone for HostRef<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: ?Sized> Debug for HostRef<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostRef")
            .field("alive", &self.is_alive())
            .finish()
    }
}
