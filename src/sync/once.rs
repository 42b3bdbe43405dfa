//! One-shot initializer: invokes a zero-argument routine at most once
//! across all threads; later calls return after the routine completes
//! (spec §4.2). Required internally for lazily allocating the per-process
//! thread registry and TLS key — exposed publicly for embedders with the
//! same lazy-global need.

use std::sync::Once as RawOnce;

pub struct OnceInit {
    inner: RawOnce,
}

impl OnceInit {
    pub const fn new() -> Self {
        OnceInit {
            inner: RawOnce::new(),
        }
    }

    /// Run `f` exactly once across all threads that call `call_once` on this
    /// instance; concurrent/later callers block until the first run
    /// completes, then return without running `f` again.
    pub fn call_once<F: FnOnce()>(&self, f: F) {
        self.inner.call_once(f);
    }

    pub fn is_completed(&self) -> bool {
        self.inner.is_completed()
    }
}

impl Default for OnceInit {
    fn default() -> Self {
        Self::new()
    }
}
