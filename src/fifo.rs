//! Threadsafe FIFO (C1) — mutex-protected double-ended queue with O(1) push/pop
//! at either end and a cached size.
//!
//! The public contract only promises ordering and O(1) push/pop at each end;
//! the node-level representation is an implementation seam (spec §9). A
//! `VecDeque` behind one lock satisfies that contract without the manual
//! doubly-linked-node bookkeeping the original C implementation needed.

use parking_lot::Mutex;
use std::collections::VecDeque;

/// A mutex-protected queue, safe to push/pop concurrently from any thread.
///
/// `pop_head`/`pop_tail` on an empty queue return `None` without blocking —
/// callers that need to wait should use [`crate::eventloop::wait`] or build
/// their own blocking layer on top (see [`crate::sync::Semaphore`]).
pub struct Fifo<T> {
    inner: Mutex<VecDeque<T>>,
}

impl<T> Fifo<T> {
    /// Create an empty queue. `capacity_hint` pre-reserves storage but never
    /// bounds the queue — growth beyond the hint is always allowed.
    pub fn new(capacity_hint: usize) -> Self {
        Fifo {
            inner: Mutex::new(VecDeque::with_capacity(capacity_hint)),
        }
    }

    /// Number of items currently queued.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push_head(&self, value: T) {
        self.inner.lock().push_front(value);
    }

    pub fn push_tail(&self, value: T) {
        self.inner.lock().push_back(value);
    }

    pub fn pop_head(&self) -> Option<T> {
        self.inner.lock().pop_front()
    }

    pub fn pop_tail(&self) -> Option<T> {
        self.inner.lock().pop_back()
    }

    /// Snapshot of the current length, used by [`crate::eventloop::pump`] to
    /// bound how many times it rotates the queue without re-examining events
    /// that arrive mid-pump.
    pub(crate) fn len_snapshot(&self) -> usize {
        self.len()
    }
}

impl<T> Default for Fifo<T> {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn push_tail_pop_head_is_fifo() {
        let q = Fifo::new(0);
        q.push_tail(1);
        q.push_tail(2);
        q.push_tail(3);
        assert_eq!(q.pop_head(), Some(1));
        assert_eq!(q.pop_head(), Some(2));
        assert_eq!(q.pop_head(), Some(3));
        assert_eq!(q.pop_head(), None);
    }

    #[test]
    fn push_head_pop_head_is_lifo() {
        let q = Fifo::new(0);
        q.push_head(1);
        q.push_head(2);
        assert_eq!(q.pop_head(), Some(2));
        assert_eq!(q.pop_head(), Some(1));
    }

    #[test]
    fn pop_on_empty_does_not_block() {
        let q: Fifo<u32> = Fifo::new(0);
        assert_eq!(q.pop_head(), None);
        assert_eq!(q.pop_tail(), None);
    }

    /// TS-1 / E2E scenario 6: N producers x M items each, one consumer,
    /// per-producer relative order preserved.
    #[test]
    fn stress_concurrent_producers_preserve_per_producer_order() {
        const PRODUCERS: u32 = 4;
        const ITEMS: u32 = 10_000;

        let q = Arc::new(Fifo::new(0));
        let mut handles = Vec::new();
        for p in 0..PRODUCERS {
            let q = Arc::clone(&q);
            handles.push(thread::spawn(move || {
                for seq in 0..ITEMS {
                    q.push_tail((p, seq));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(q.len(), (PRODUCERS * ITEMS) as usize);

        let mut next_seq = vec![0u32; PRODUCERS as usize];
        let mut seen = 0u32;
        while let Some((p, seq)) = q.pop_head() {
            assert_eq!(seq, next_seq[p as usize]);
            next_seq[p as usize] += 1;
            seen += 1;
        }
        assert_eq!(seen, PRODUCERS * ITEMS);
        assert_eq!(q.len(), 0);
    }
}
