//! Timer (C7): a detached worker thread that sleeps and posts `TIMER`
//! events back to its creator, per one of two drift policies.

use crate::error::Error;
use crate::event::{EventKind, EventPayload, UserPtr};
use crate::eventloop;
use crate::thread::{self, Thread, ThreadAttrs, ThreadHandle, ThreadId};
use std::time::{Duration, Instant};

/// Cadence policy for a repeating timer (spec §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    /// Fire once after `interval`, then stop.
    OneShot,
    /// Maintain a fixed phase: each deadline is the previous deadline plus
    /// `interval`, so a late fire doesn't push later ones back — the
    /// drift-free floor.
    PeriodicMinimum,
    /// Sleep `interval` after each fire regardless of how long the previous
    /// cycle took — simpler, but cumulative scheduling overhead drifts the
    /// average period upward over a long run.
    PeriodicAverage,
}

/// A running timer. Dropping this handle does not stop the timer — call
/// [`Timer::cancel`] explicitly (spec §4.6: the worker thread, not the
/// handle, owns the schedule). Only the thread that created a timer may
/// cancel it (a non-owner that tries gets `Error::Perm`).
pub struct Timer {
    worker: Thread,
    worker_handle: ThreadHandle,
    creator: ThreadId,
}

impl Timer {
    /// Start a timer that posts `TIMER` events (with `user_ptr`) to the
    /// calling thread according to `mode`.
    pub fn new(interval: Duration, mode: TimerMode, user_ptr: UserPtr) -> Result<Timer, Error> {
        let creator = thread::self_handle();
        let target = creator.clone();

        let worker = thread::spawn(
            ThreadAttrs::new().set_debug_name("timer"),
            move || {
                run_worker(interval, mode, user_ptr, target);
                0
            },
        )?;
        let worker_handle = worker.handle();

        Ok(Timer {
            worker,
            worker_handle,
            creator: creator.id(),
        })
    }

    /// Stop future fires. Posts `QUIT` to the worker and blocks until it has
    /// actually terminated (spec §4.6), so no `TIMER` event with this
    /// timer's user pointer can arrive at the creator once this returns.
    /// `Error::Perm` if called from a thread other than the one that created
    /// this timer.
    pub fn cancel(&self) -> Result<(), Error> {
        if thread::self_handle().id() != self.creator {
            crate::error::set_last_error(Error::Perm);
            return Err(Error::Perm);
        }
        eventloop::post_thread_event(&self.worker_handle, EventPayload::Quit, 0);
        self.worker.join().map(|_| ())
    }

    /// The thread that created (and is the delivery target of) this timer.
    pub fn creator(&self) -> ThreadId {
        self.creator
    }
}

/// The worker loop spec §4.6 describes literally: sleep, post, (for
/// periodic modes) check its own queue for a cancelling `QUIT` before
/// looping back to sleep again.
fn run_worker(interval: Duration, mode: TimerMode, user_ptr: UserPtr, target: ThreadHandle) {
    let mut next_deadline = Instant::now() + interval;
    loop {
        let sleep_for = match mode {
            TimerMode::PeriodicMinimum => next_deadline.saturating_duration_since(Instant::now()),
            TimerMode::OneShot | TimerMode::PeriodicAverage => interval,
        };
        std::thread::sleep(sleep_for);

        eventloop::post_thread_event(&target, EventPayload::Timer, user_ptr);

        match mode {
            TimerMode::OneShot => return,
            TimerMode::PeriodicMinimum => next_deadline += interval,
            TimerMode::PeriodicAverage => {}
        }

        if let Some(event) = eventloop::wait(Some(0)) {
            if event.kind() == EventKind::Quit {
                return;
            }
            eventloop::default_event_handler(Some(&event));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// TT-1: a one-shot timer posts exactly one `TIMER` event.
    #[test]
    fn one_shot_timer_fires_exactly_once() {
        thread::spawn(ThreadAttrs::new(), || {
            let _timer = Timer::new(Duration::from_millis(5), TimerMode::OneShot, 0).unwrap();
            std::thread::sleep(Duration::from_millis(60));
            let mut count = 0;
            while let Some(event) = eventloop::wait(Some(0)) {
                if event.kind() == EventKind::Timer {
                    count += 1;
                }
            }
            assert_eq!(count, 1);
            0
        })
        .unwrap()
        .join()
        .unwrap();
    }

    /// TT-2: cancelling a periodic timer stops further fires.
    #[test]
    fn cancel_stops_further_fires() {
        thread::spawn(ThreadAttrs::new(), || {
            let timer = Timer::new(Duration::from_millis(5), TimerMode::PeriodicMinimum, 0).unwrap();
            std::thread::sleep(Duration::from_millis(55));
            timer.cancel().unwrap();

            let mut count_before = 0;
            while let Some(event) = eventloop::wait(Some(0)) {
                if event.kind() == EventKind::Timer {
                    count_before += 1;
                }
            }
            assert!(count_before >= 5, "count_before = {count_before}");

            std::thread::sleep(Duration::from_millis(30));
            let mut count_after = 0;
            while let Some(event) = eventloop::wait(Some(0)) {
                if event.kind() == EventKind::Timer {
                    count_after += 1;
                }
            }
            assert_eq!(count_after, 0);
            0
        })
        .unwrap()
        .join()
        .unwrap();
    }

    /// Only the creating thread may cancel (spec §4.6, mirroring TW-2 for
    /// windows); a timer cancelled from elsewhere keeps firing.
    #[test]
    fn cancel_from_another_thread_is_rejected() {
        thread::spawn(ThreadAttrs::new(), || {
            let timer = Timer::new(Duration::from_millis(5), TimerMode::PeriodicMinimum, 0).unwrap();

            thread::spawn(ThreadAttrs::new(), move || {
                assert_eq!(timer.cancel(), Err(Error::Perm));
                0
            })
            .unwrap()
            .join()
            .unwrap();
            0
        })
        .unwrap()
        .join()
        .unwrap();
    }
}
