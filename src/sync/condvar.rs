//! Condition variable: `wait` releases the paired mutex atomically and
//! re-acquires it on wake; `notify_one`/`notify_all` match spec §4.2's
//! "wakes at least one waiter"/"wakes all".

use super::mutex::MutexGuard;
use parking_lot::Condvar as RawCondVar;
use std::time::Duration;

pub struct CondVar {
    inner: RawCondVar,
}

impl CondVar {
    pub fn new() -> Self {
        CondVar {
            inner: RawCondVar::new(),
        }
    }

    /// Block until notified. Infinite wait, per spec §5.
    pub fn wait<'a, T>(&self, guard: &mut MutexGuard<'a, T>) {
        self.inner.wait(guard);
    }

    /// Block until notified or `timeout` elapses. Returns `true` if it timed
    /// out first.
    pub fn wait_timeout<'a, T>(&self, guard: &mut MutexGuard<'a, T>, timeout: Duration) -> bool {
        self.inner.wait_for(guard, timeout).timed_out()
    }

    pub fn notify_one(&self) {
        self.inner.notify_one();
    }

    pub fn notify_all(&self) {
        self.inner.notify_all();
    }
}

impl Default for CondVar {
    fn default() -> Self {
        Self::new()
    }
}
