//! Event loop (C6): posting, pumping, and waiting on a thread's event queue,
//! plus the `HostEventSource` seam that lets the windowing/input backends
//! feed native events into the same queue the rest of this crate already
//! understands (spec §9 REDESIGN FLAGS).

use crate::event::{Event, EventKind, EventPayload, UserPtr};
use crate::callback::CallbackFn;
use crate::thread::{self, ThreadHandle};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// One native event source per host. Implementors translate whatever the
/// platform hands them into this crate's [`Event`] type; the event loop
/// never talks to the host directly.
pub trait HostEventSource: Send {
    /// Return every event ready right now, without blocking.
    fn poll(&mut self) -> Vec<Event>;
}

/// Installed on a thread that has not created a window — a no-op source.
pub struct NullHostSource;

impl HostEventSource for NullHostSource {
    fn poll(&mut self) -> Vec<Event> {
        Vec::new()
    }
}

/// Deterministic, fully in-memory host source for tests and headless
/// embedders: events queued with [`MockHostSource::push`] are returned
/// (in order) the next time the event loop polls.
#[derive(Default)]
pub struct MockHostSource {
    pending: VecDeque<Event>,
}

impl MockHostSource {
    pub fn new() -> Self {
        MockHostSource {
            pending: VecDeque::new(),
        }
    }

    pub fn push(&mut self, payload: EventPayload, user_ptr: UserPtr) {
        self.pending.push_back(Event::new(payload, user_ptr));
    }
}

impl HostEventSource for MockHostSource {
    fn poll(&mut self) -> Vec<Event> {
        self.pending.drain(..).collect()
    }
}

/// Replace the calling thread's host event source (spec §4.7: one source per
/// thread that owns a window). Only meaningful on the thread that called it.
pub fn set_host_source(source: Box<dyn HostEventSource>) {
    thread::with_current(|ctx| ctx.set_host_source(source));
}

/// Queue `payload` on the calling thread's own queue.
pub fn post_event(payload: EventPayload, user_ptr: UserPtr) {
    thread::with_current(|ctx| {
        let mut event = Event::new(payload, user_ptr);
        event.stamp_if_unset();
        ctx.queue().push_tail(event);
    });
}

/// Queue `payload` on another thread's queue (spec §3: "other threads may
/// push", the only cross-thread-safe queue operation).
pub fn post_thread_event(target: &ThreadHandle, payload: EventPayload, user_ptr: UserPtr) {
    let mut event = Event::new(payload, user_ptr);
    event.stamp_if_unset();
    target.context().queue().push_tail(event);
}

/// Register (or, with `handler: None`, remove) a callback on the calling
/// thread for events matching `(kind_filter, user_ptr)`.
pub fn install_callback(
    kind_filter: Option<EventKind>,
    user_ptr: UserPtr,
    handler: Option<CallbackFn>,
) {
    thread::with_current(|ctx| ctx.with_callbacks(|registry| registry.install(kind_filter, user_ptr, handler)));
}

/// Dispatch-or-requeue every event matching the snapshot, callback table
/// lookup at arrival for host events (spec §4.5). Run a match against
/// `ctx.with_callbacks`; consumed events are dropped, everything else is
/// pushed to the tail of the same queue.
fn dispatch_or_requeue(ctx: &thread::ThreadContext, mut event: Event) {
    event.stamp_if_unset();
    let consumed = ctx.with_callbacks(|registry| registry.try_dispatch(&event));
    if !consumed {
        ctx.queue().push_tail(event);
    }
}

/// Non-blocking pump (spec §4.5): drains the current thread's queue and the
/// host event source, dispatching to callbacks and leaving everything else
/// queued. Never returns an event itself — that's [`wait`]'s job (spec §4.5
/// step 4) — `pump` only advances the queue/callback state.
///
/// 1. Snapshot the queue's length at the start of the call. Pop exactly that
///    many events from the head, one at a time: if a callback matches, it
///    consumes the event; otherwise the event is pushed back to the tail.
///    Every event that was in the queue when `pump` was called gets exactly
///    one callback lookup in this call, in FIFO order, and events that
///    arrive mid-pump (requeued ones, or host events below) are not
///    re-examined until a later `pump`/`wait`.
/// 2. Drain the host event source and translate each native event,
///    dispatching it to the callback table as it arrives; anything not
///    consumed is enqueued for a later wait/pump, same as step 1.
pub fn pump() {
    thread::with_current(|ctx| {
        let snapshot = ctx.queue().len_snapshot();
        for _ in 0..snapshot {
            match ctx.queue().pop_head() {
                Some(event) => dispatch_or_requeue(ctx, event),
                None => break,
            }
        }

        let host_events = ctx.with_host_source(|source| source.poll());
        for event in host_events {
            dispatch_or_requeue(ctx, event);
        }
    });
}

/// Optionally sleep, pump once, and return at most one event (spec §4.5).
///
/// 1. Free the previously held `last_event`, if any.
/// 2. `timeout_ns = None` is the "-1" case: no sleep. `Some(ns)` sleeps the
///    full `ns` nanoseconds — unconditionally, even if an event is already
///    queued. There is no "block until an event arrives" mode: callers that
///    want that call `wait` repeatedly with a short timeout (spec §5: "it
///    does not currently block on queue fill").
/// 3. Run [`pump`] once.
/// 4. If the queue is non-empty, pop one event into `last_event` and return
///    it; otherwise return `None` and set `last_error` to
///    [`crate::Error::TryAgain`].
pub fn wait(timeout_ns: Option<u64>) -> Option<Event> {
    thread::with_current(|ctx| ctx.set_last_event(None));

    if let Some(ns) = timeout_ns {
        std::thread::sleep(Duration::from_nanos(ns));
    }

    pump();

    let popped = thread::with_current(|ctx| ctx.queue().pop_head());
    match popped {
        Some(event) => {
            thread::with_current(|ctx| ctx.set_last_event(Some(event.clone())));
            Some(event)
        }
        None => {
            crate::error::set_last_error(crate::Error::TryAgain);
            None
        }
    }
}

/// The event [`wait`] most recently returned, consumed on read.
pub fn last_event() -> Option<Event> {
    thread::with_current(|ctx| ctx.take_last_event())
}

/// Fallback handler for an event a caller's own `switch` didn't handle.
/// `QUIT` terminates the calling thread (spec §4.5); every other kind is
/// silently dropped.
pub fn default_event_handler(event: Option<&Event>) {
    if let Some(event) = event {
        if event.kind() == EventKind::Quit {
            thread::exit(0);
        }
    }
}
