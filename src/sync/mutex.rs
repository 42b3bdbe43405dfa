//! Non-recursive mutex. Double-locking by the same thread deadlocks rather
//! than panicking — the same undefined-by-contract behavior spec §4.2
//! documents ("undefined behavior on double lock by the same thread").

use parking_lot::Mutex as RawMutex;
pub use parking_lot::MutexGuard;

/// A non-recursive mutex guarding `T`.
pub struct Mutex<T> {
    inner: RawMutex<T>,
}

impl<T> Mutex<T> {
    pub fn new(value: T) -> Self {
        Mutex {
            inner: RawMutex::new(value),
        }
    }

    /// Acquire the mutex, blocking until available.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock()
    }

    /// Acquire without blocking; `None` if already held.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, T>> {
        self.inner.try_lock()
    }
}
