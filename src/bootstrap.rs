//! Bootstrap (C9): the sequence every process using this crate runs before
//! calling into its own entry point.
//!
//! 1. Resolve [`crate::config::RuntimeConfig`] from the environment and
//!    install it process-wide.
//! 2. Install a `tracing` subscriber filtered by that config (never reset
//!    on the way out — the ambient convention is "set once at process
//!    start").
//! 3. Allocate the process-wide user-pointer mutex (spec §4.8 step 3) —
//!    satisfied by [`crate::userptr`]'s static `Mutex`, already live before
//!    `run` is ever called; nothing further to do here.
//! 4. Construct the main thread's [`crate::thread::ThreadContext`] and make
//!    it current.
//! 5. Collect `argv` from [`std::env::args`] and call `entry`.
//! 6. Return the entry function's exit code to the caller (conventionally
//!    passed straight to [`std::process::exit`]).

use crate::config;
use crate::thread::{self, ThreadContext};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Run `entry` as the program's body. Call this once, from what would
/// otherwise be `fn main`.
///
/// A `QUIT` event delivered to the main thread unwinds `entry` via
/// [`crate::thread::exit`] the same way it terminates any other thread (spec
/// §4.3); `run` catches that unwind here and returns its code, rather than
/// letting the panic escape to the real `fn main`.
pub fn run(entry: impl FnOnce(&[String]) -> i32) -> i32 {
    let cfg = config::RuntimeConfig::from_env();
    config::install(cfg.clone());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(cfg.log_filter.clone()))
        .try_init();

    let main_ctx = Arc::new(ThreadContext::new("main".to_string(), cfg.default_fifo_capacity_hint));
    thread::set_current(main_ctx);

    tracing::info!("bootstrap complete, entering program entry point");

    let args: Vec<String> = std::env::args().collect();
    let code = match std::panic::catch_unwind(AssertUnwindSafe(|| entry(&args))) {
        Ok(code) => code,
        Err(payload) => match payload.downcast::<thread::ThreadExit>() {
            Ok(boxed) => boxed.code(),
            Err(original) => {
                thread::clear_current();
                std::panic::resume_unwind(original);
            }
        },
    };

    thread::clear_current();
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_receives_args_and_its_code_is_returned() {
        let code = run(|args| {
            assert!(!args.is_empty(), "argv[0] should always be present");
            assert!(thread::try_self_handle().is_some());
            42
        });
        assert_eq!(code, 42);
        assert!(thread::try_self_handle().is_none());
    }

    /// Spec §4.3: a `QUIT` delivered to the main thread unwinds the entry
    /// point via `thread::exit`, rather than the panic escaping `run`.
    #[test]
    fn quit_unwinds_entry_and_run_returns_its_code() {
        let code = run(|_args| {
            thread::exit(5);
            #[allow(unreachable_code)]
            99
        });
        assert_eq!(code, 5);
        assert!(thread::try_self_handle().is_none());
    }
}
