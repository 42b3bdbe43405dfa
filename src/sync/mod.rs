//! Synchronization primitives (C2): mutex, condition variable, counting
//! semaphore and one-shot initializer.
//!
//! Built on `parking_lot` rather than `std::sync` — non-poisoning guards,
//! smaller footprint, the same choice `foundry-rs/foundry` makes for its own
//! hot-path locking. Poisoning isn't a concept spec §2 asks for anyway: a
//! panic inside a held lock in this design simply unwinds past the guard's
//! `Drop`, which still releases the lock (matching the teacher's own
//! `MutexGuard::drop` unconditionally clearing `locked`).

mod condvar;
mod mutex;
mod once;
mod semaphore;

pub use condvar::CondVar;
pub use mutex::{Mutex, MutexGuard};
pub use once::OnceInit;
pub use semaphore::Semaphore;
