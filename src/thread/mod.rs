//! Thread (C3): spawn, join, detach, and the per-thread context every other
//! component (queue, callbacks, TLS, host event source) hangs off of.

mod context;

pub use context::{ThreadContext, ThreadId};

use crate::error::Error;
use parking_lot::Mutex;
use std::cell::RefCell;
use std::sync::mpsc;
use std::sync::Arc;

thread_local! {
    static CURRENT: RefCell<Option<Arc<ThreadContext>>> = const { RefCell::new(None) };
}

pub(crate) fn set_current(ctx: Arc<ThreadContext>) {
    CURRENT.with(|cell| *cell.borrow_mut() = Some(ctx));
}

pub(crate) fn clear_current() {
    CURRENT.with(|cell| *cell.borrow_mut() = None);
}

/// Run `f` with the calling thread's context. Panics if called before
/// [`crate::bootstrap::run`] or outside a thread spawned by this crate — a
/// programming defect per spec §7's policy.
pub(crate) fn with_current<R>(f: impl FnOnce(&Arc<ThreadContext>) -> R) -> R {
    try_with_current(f).expect("no current thread context — call from within bootstrap::run or a spawned thread")
}

pub(crate) fn try_with_current<R>(f: impl FnOnce(&Arc<ThreadContext>) -> R) -> Option<R> {
    CURRENT.with(|cell| cell.borrow().as_ref().map(f))
}

/// A cloneable, cross-thread-safe reference to a thread's context. This is
/// what callers exchange to target [`crate::eventloop::post_thread_event`]
/// or to check thread identity (e.g. a window's creator thread).
#[derive(Clone)]
pub struct ThreadHandle(Arc<ThreadContext>);

impl ThreadHandle {
    pub fn id(&self) -> ThreadId {
        self.0.id()
    }

    pub fn name(&self) -> String {
        self.0.name()
    }

    pub(crate) fn context(&self) -> &ThreadContext {
        &self.0
    }
}

impl PartialEq for ThreadHandle {
    fn eq(&self, other: &Self) -> bool {
        self.0.id() == other.0.id()
    }
}
impl Eq for ThreadHandle {}

/// Whether a spawned thread is joinable or detaches immediately (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetachState {
    Joinable,
    Detached,
}

/// Thread creation attributes: stack size, detach state, and an optional
/// debug name (truncated to 31 bytes + NUL, matching the teacher's
/// fixed-size name budget — see [`ThreadAttrs::set_debug_name`]).
#[derive(Debug, Clone)]
pub struct ThreadAttrs {
    detach_state: DetachState,
    stack_size: Option<usize>,
    debug_name: Option<String>,
}

impl ThreadAttrs {
    pub fn new() -> Self {
        ThreadAttrs {
            detach_state: DetachState::Joinable,
            stack_size: None,
            debug_name: None,
        }
    }

    pub fn set_detach_state(mut self, state: DetachState) -> Self {
        self.detach_state = state;
        self
    }

    pub fn set_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Truncated (on a char boundary) to 31 bytes, leaving room for a
    /// trailing NUL when surfaced through a native thread-naming API.
    pub fn set_debug_name(mut self, name: &str) -> Self {
        let mut truncated = name.to_string();
        while truncated.len() > 31 {
            truncated.pop();
        }
        self.debug_name = Some(truncated);
        self
    }
}

impl Default for ThreadAttrs {
    fn default() -> Self {
        Self::new()
    }
}

/// Payload carried by the panic [`exit`] raises to unwind out of the entry
/// function without running the rest of it — the standard technique for an
/// explicit "exit now" that isn't simply returning from `main`. Caught by
/// [`spawn`]'s own worker closure and, for the main thread, by
/// [`crate::bootstrap::run`] (spec §4.3: "delivered to the main thread it
/// unwinds the user entry point").
pub(crate) struct ThreadExit(i32);

impl ThreadExit {
    pub(crate) fn code(&self) -> i32 {
        self.0
    }
}

/// Terminate the calling thread immediately with `code`, as if its entry
/// function had returned `code`. Never returns.
pub fn exit(code: i32) -> ! {
    std::panic::panic_any(ThreadExit(code))
}

/// A spawned thread's handle: query its identity, join it, or detach it.
pub struct Thread {
    handle: ThreadHandle,
    join_handle: Mutex<Option<std::thread::JoinHandle<i32>>>,
}

impl Thread {
    pub fn id(&self) -> ThreadId {
        self.handle.id()
    }

    pub fn name(&self) -> String {
        self.handle.name()
    }

    pub fn handle(&self) -> ThreadHandle {
        self.handle.clone()
    }

    /// Block until the thread terminates, returning its exit code.
    /// `Error::Invalid` if the thread was created detached, or has already
    /// been joined/detached.
    pub fn join(&self) -> Result<i32, Error> {
        let mut guard = self.join_handle.lock();
        match guard.take() {
            Some(std_handle) => std_handle.join().map_err(|_| {
                crate::error::set_last_error(Error::Invalid);
                Error::Invalid
            }),
            None => {
                crate::error::set_last_error(Error::Invalid);
                Err(Error::Invalid)
            }
        }
    }

    /// Release this thread to run to completion unobserved. `Error::Invalid`
    /// if it was created detached, or has already been joined/detached.
    pub fn detach(&self) -> Result<(), Error> {
        let mut guard = self.join_handle.lock();
        match guard.take() {
            Some(std_handle) => {
                drop(std_handle);
                Ok(())
            }
            None => {
                crate::error::set_last_error(Error::Invalid);
                Err(Error::Invalid)
            }
        }
    }
}

/// Spawn a new thread running `entry`, returning a [`Thread`] handle once
/// the child has constructed and published its own [`ThreadContext`].
pub fn spawn<F>(attrs: ThreadAttrs, entry: F) -> Result<Thread, Error>
where
    F: FnOnce() -> i32 + Send + 'static,
{
    let mut builder = std::thread::Builder::new();
    if let Some(name) = &attrs.debug_name {
        builder = builder.name(name.clone());
    }
    let stack_size = attrs
        .stack_size
        .unwrap_or_else(|| crate::config::current().default_stack_size);
    builder = builder.stack_size(stack_size);

    let thread_name = attrs.debug_name.clone().unwrap_or_default();
    let fifo_hint = crate::config::current().default_fifo_capacity_hint;
    let (ctx_tx, ctx_rx) = mpsc::sync_channel::<Arc<ThreadContext>>(1);

    let std_handle = builder
        .spawn(move || {
            let ctx = Arc::new(ThreadContext::new(thread_name, fifo_hint));
            set_current(Arc::clone(&ctx));
            let _ = ctx_tx.send(Arc::clone(&ctx));

            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(entry));
            let code = match result {
                Ok(code) => code,
                Err(payload) => match payload.downcast::<ThreadExit>() {
                    Ok(boxed) => boxed.0,
                    Err(original) => {
                        clear_current();
                        std::panic::resume_unwind(original);
                    }
                },
            };
            clear_current();
            code
        })
        .map_err(|e| crate::error::map_io_error(&e))?;

    let ctx = ctx_rx
        .recv()
        .map_err(|_| Error::Invalid)?;

    let join_handle = match attrs.detach_state {
        DetachState::Detached => {
            drop(std_handle);
            None
        }
        DetachState::Joinable => Some(std_handle),
    };

    Ok(Thread {
        handle: ThreadHandle(ctx),
        join_handle: Mutex::new(join_handle),
    })
}

/// The calling thread's own handle. Panics outside a context established by
/// [`crate::bootstrap::run`] or [`spawn`] — a programming defect.
pub fn self_handle() -> ThreadHandle {
    try_self_handle().expect("no current thread context — call from within bootstrap::run or a spawned thread")
}

pub fn try_self_handle() -> Option<ThreadHandle> {
    try_with_current(|ctx| ThreadHandle(Arc::clone(ctx)))
}
