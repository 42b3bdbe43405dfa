//! Per-thread context (spec §3): the event queue, the held "last event"
//! slot, the callback table, a TLS slot, and the directory-iterator scratch
//! the filesystem collaborator uses.
//!
//! A `ThreadContext` is shared (via `Arc`) between the owning thread and any
//! other thread that holds a [`super::ThreadHandle`] to it, but only the
//! `queue` and `name` fields are ever touched by a non-owning thread —
//! everything else is accessed only through the `assert_owner`-guarded
//! accessors below, matching spec §3's "queue may only be drained by the
//! owning thread; other threads may push" and "callback table... not
//! shared".

use crate::callback::CallbackRegistry;
use crate::event::Event;
use crate::eventloop::{HostEventSource, NullHostSource};
use crate::fifo::Fifo;
use crate::fs::DirEntry;
use parking_lot::Mutex;
use std::cell::{Cell, RefCell};
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide unique thread identity, assigned at spawn/bootstrap time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThreadId(pub(crate) u64);

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

impl ThreadId {
    pub(crate) fn next() -> Self {
        ThreadId(NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed))
    }
}

pub struct ThreadContext {
    id: ThreadId,
    std_tid: std::thread::ThreadId,
    queue: Fifo<Event>,
    name: Mutex<String>,
    last_event: RefCell<Option<Event>>,
    last_dirent: RefCell<Option<DirEntry>>,
    callbacks: RefCell<CallbackRegistry>,
    tls_slot: Cell<*mut ()>,
    host_source: RefCell<Box<dyn HostEventSource>>,
}

// SAFETY: the `queue` and `name` fields use their own internal locking and
// are the only fields ever touched from a thread other than the owner.
// Every other accessor below asserts (in debug builds) that it is being
// called from the owning OS thread.
unsafe impl Send for ThreadContext {}
unsafe impl Sync for ThreadContext {}

impl ThreadContext {
    pub(crate) fn new(name: String, fifo_capacity_hint: usize) -> Self {
        ThreadContext {
            id: ThreadId::next(),
            std_tid: std::thread::current().id(),
            queue: Fifo::new(fifo_capacity_hint),
            name: Mutex::new(name),
            last_event: RefCell::new(None),
            last_dirent: RefCell::new(None),
            callbacks: RefCell::new(CallbackRegistry::new()),
            tls_slot: Cell::new(std::ptr::null_mut()),
            host_source: RefCell::new(Box::new(NullHostSource)),
        }
    }

    fn assert_owner(&self, what: &str) {
        debug_assert_eq!(
            std::thread::current().id(),
            self.std_tid,
            "{what} accessed from a thread other than its owner"
        );
    }

    pub fn id(&self) -> ThreadId {
        self.id
    }

    pub fn name(&self) -> String {
        self.name.lock().clone()
    }

    pub(crate) fn set_name(&self, name: String) {
        *self.name.lock() = name;
    }

    /// Safe to call from any thread: pushes onto the owner's queue.
    pub fn queue(&self) -> &Fifo<Event> {
        &self.queue
    }

    pub(crate) fn take_last_event(&self) -> Option<Event> {
        self.assert_owner("last_event");
        self.last_event.borrow_mut().take()
    }

    pub(crate) fn set_last_event(&self, event: Option<Event>) {
        self.assert_owner("last_event");
        *self.last_event.borrow_mut() = event;
    }

    pub(crate) fn with_callbacks<R>(&self, f: impl FnOnce(&mut CallbackRegistry) -> R) -> R {
        self.assert_owner("callback table");
        f(&mut self.callbacks.borrow_mut())
    }

    pub(crate) fn with_host_source<R>(&self, f: impl FnOnce(&mut dyn HostEventSource) -> R) -> R {
        self.assert_owner("host event source");
        f(self.host_source.borrow_mut().as_mut())
    }

    pub(crate) fn set_host_source(&self, source: Box<dyn HostEventSource>) {
        self.assert_owner("host event source");
        *self.host_source.borrow_mut() = source;
    }

    pub fn tls_get(&self) -> *mut () {
        self.assert_owner("tls slot");
        self.tls_slot.get()
    }

    pub fn tls_set(&self, value: *mut ()) {
        self.assert_owner("tls slot");
        self.tls_slot.set(value);
    }

    pub(crate) fn with_last_dirent<R>(&self, f: impl FnOnce(&mut Option<DirEntry>) -> R) -> R {
        self.assert_owner("directory iterator scratch");
        f(&mut self.last_dirent.borrow_mut())
    }
}
