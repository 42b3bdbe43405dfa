//! Process-wide global user-pointer slot (spec §4.8 step 3, §5: "Process-wide
//! singletons: global user-pointer ... protected by a dedicated mutex.
//! Setter/getter pairs always lock/unlock symmetrically.").
//!
//! Distinct from the per-event `user_ptr` filter key carried on every
//! [`crate::event::Event`]/[`crate::eventloop::install_callback`] — this is a
//! single process-wide value, not a per-registration one, mirroring the
//! original's `kdSetEventUserptr`/`__kd_userptrmtx` global.

use crate::event::UserPtr;
use parking_lot::Mutex;

static GLOBAL_USER_PTR: Mutex<UserPtr> = Mutex::new(0);

/// Read the process-wide user pointer. Zero until set.
pub fn global_user_ptr() -> UserPtr {
    *GLOBAL_USER_PTR.lock()
}

/// Replace the process-wide user pointer.
pub fn set_global_user_ptr(value: UserPtr) {
    *GLOBAL_USER_PTR.lock() = value;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_zero_and_round_trips() {
        assert_eq!(global_user_ptr(), 0);
        set_global_user_ptr(42);
        assert_eq!(global_user_ptr(), 42);
        set_global_user_ptr(0);
    }
}
