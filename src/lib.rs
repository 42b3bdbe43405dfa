//! A hosted Rust runtime providing a threadsafe FIFO, synchronization
//! primitives, threads with per-thread event queues and callback tables, a
//! pollable/blocking event loop, timers, a single window bridge, a
//! filesystem collaborator, IPv4 sockets with asynchronous name lookup, a
//! PRNG, a monotonic clock, and a bootstrap sequence tying them together.
//!
//! Start with [`bootstrap::run`], spawn additional threads with
//! [`thread::spawn`], and drive each thread's queue with
//! [`eventloop::pump`]/[`eventloop::wait`].

pub mod bootstrap;
pub mod callback;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod eventloop;
pub mod fifo;
pub mod fs;
pub mod net;
pub mod rand;
pub mod sync;
pub mod thread;
pub mod timer;
pub mod userptr;
pub mod window;

pub use error::Error;
pub use event::{ArrowKey, Event, EventKind, EventPayload, PointerAxis, UserPtr, WILDCARD_USER_PTR};
