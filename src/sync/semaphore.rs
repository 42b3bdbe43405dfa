//! Counting semaphore: "integer counter with mutex+condvar fallback
//! semantics" (spec §4.2), implemented exactly that way.

use super::condvar::CondVar;
use super::mutex::Mutex;

pub struct Semaphore {
    count: Mutex<i64>,
    non_zero: CondVar,
}

impl Semaphore {
    pub fn new(initial: i64) -> Self {
        Semaphore {
            count: Mutex::new(initial),
            non_zero: CondVar::new(),
        }
    }

    /// Decrement, blocking while the counter is zero.
    pub fn wait(&self) {
        let mut guard = self.count.lock();
        while *guard <= 0 {
            self.non_zero.wait(&mut guard);
        }
        *guard -= 1;
    }

    /// Increment and wake one waiter.
    pub fn post(&self) {
        let mut guard = self.count.lock();
        *guard += 1;
        drop(guard);
        self.non_zero.notify_one();
    }

    /// Decrement without blocking. `true` if the counter was positive.
    pub fn try_wait(&self) -> bool {
        let mut guard = self.count.lock();
        if *guard > 0 {
            *guard -= 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn wait_blocks_until_post() {
        let sem = Arc::new(Semaphore::new(0));
        let sem2 = Arc::clone(&sem);
        let handle = thread::spawn(move || {
            sem2.wait();
        });
        thread::sleep(Duration::from_millis(50));
        sem.post();
        handle.join().unwrap();
    }

    #[test]
    fn try_wait_does_not_block_when_empty() {
        let sem = Semaphore::new(0);
        assert!(!sem.try_wait());
        sem.post();
        assert!(sem.try_wait());
        assert!(!sem.try_wait());
    }
}
