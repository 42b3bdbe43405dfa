//! Event (C4): a tagged, timestamped record delivered to one thread's queue.
//!
//! Modeled as a single tagged `enum` rather than a kind id + payload union
//! (spec §9 REDESIGN FLAGS: "tagged variant with one arm per event kind").
//! [`EventKind`] carries the kind numbering that is part of the ABI (spec
//! §6) when this crate is consumed as a library; [`Event::kind`] derives it
//! from the payload so the two can never drift apart.

use crate::clock::MonotonicClock;
use crate::error::Error;
use std::net::Ipv4Addr;
use std::sync::OnceLock;

/// Opaque per-registration identity. Spec §6: "the user-pointer wildcard
/// value (0) is part of the ABI" — [`UserPtr::WILDCARD`] is that value.
pub type UserPtr = usize;

/// Canonical arrow-key codes (spec §3, grounded on `ATX_keyboard.h`'s
/// `KD_KEY_*_ATX` constants).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowKey {
    Up,
    Down,
    Left,
    Right,
}

/// Which axis an `INPUT_POINTER` motion event reports (spec §4.7: "Pointer
/// motion → two POINTER events (sub-index X then sub-index Y)").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAxis {
    X,
    Y,
}

/// Event kind tag. Discriminants are part of the library's ABI (spec §6)
/// and must not be renumbered once published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum EventKind {
    Quit = 1,
    Pause = 2,
    Resume = 3,
    Orientation = 4,
    WindowClose = 5,
    WindowFocus = 6,
    WindowRedraw = 7,
    WindowPropertyChange = 8,
    Timer = 9,
    InputPointer = 10,
    InputKey = 11,
    InputKeyChar = 12,
    NameLookupComplete = 13,
    SocketReadable = 14,
    SocketWritable = 15,
    SocketConnectComplete = 16,
    SocketIncoming = 17,
}

/// Kind-specific payload. One arm per [`EventKind`].
#[derive(Debug, Clone)]
pub enum EventPayload {
    Quit,
    Pause,
    Resume,
    Orientation { degrees: u32 },
    WindowClose,
    WindowFocus { focused: bool },
    WindowRedraw,
    WindowPropertyChange,
    Timer,
    PointerMotion { axis: PointerAxis, value: i32 },
    PointerSelect { selected: bool, x: i32, y: i32 },
    Key { pressed: bool, code: ArrowKey },
    KeyChar { ch: char },
    NameLookupComplete(Result<Vec<Ipv4Addr>, Error>),
    SocketReadable,
    SocketWritable,
    SocketConnectComplete(Result<(), Error>),
    SocketIncoming,
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::Quit => EventKind::Quit,
            EventPayload::Pause => EventKind::Pause,
            EventPayload::Resume => EventKind::Resume,
            EventPayload::Orientation { .. } => EventKind::Orientation,
            EventPayload::WindowClose => EventKind::WindowClose,
            EventPayload::WindowFocus { .. } => EventKind::WindowFocus,
            EventPayload::WindowRedraw => EventKind::WindowRedraw,
            EventPayload::WindowPropertyChange => EventKind::WindowPropertyChange,
            EventPayload::Timer => EventKind::Timer,
            EventPayload::PointerMotion { .. } => EventKind::InputPointer,
            EventPayload::PointerSelect { .. } => EventKind::InputPointer,
            EventPayload::Key { .. } => EventKind::InputKey,
            EventPayload::KeyChar { .. } => EventKind::InputKeyChar,
            EventPayload::NameLookupComplete(_) => EventKind::NameLookupComplete,
            EventPayload::SocketReadable => EventKind::SocketReadable,
            EventPayload::SocketWritable => EventKind::SocketWritable,
            EventPayload::SocketConnectComplete(_) => EventKind::SocketConnectComplete,
            EventPayload::SocketIncoming => EventKind::SocketIncoming,
        }
    }
}

/// A tagged, timestamped record delivered to one thread's queue.
#[derive(Debug, Clone)]
pub struct Event {
    /// Nanoseconds since an unspecified monotonic epoch. Zero until the
    /// event is actually posted (spec §3 Event lifecycle), at which point
    /// [`crate::thread::ThreadContext::post_event`]/`post_thread_event`
    /// assign the real value if it is still zero.
    pub timestamp_ns: u64,
    pub user_ptr: UserPtr,
    pub payload: EventPayload,
}

/// The wildcard user-pointer value callbacks may filter on to match any
/// event's user pointer (spec §4.4/§6).
pub const WILDCARD_USER_PTR: UserPtr = 0;

impl Event {
    /// Create an event with a zeroed timestamp; the kind is whatever
    /// `payload` carries.
    pub fn new(payload: EventPayload, user_ptr: UserPtr) -> Self {
        Event {
            timestamp_ns: 0,
            user_ptr,
            payload,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    /// Stamp the event with the current time if it hasn't been stamped yet.
    pub(crate) fn stamp_if_unset(&mut self) {
        if self.timestamp_ns == 0 {
            self.timestamp_ns = now_ns();
        }
    }
}

static EVENT_CLOCK: OnceLock<MonotonicClock> = OnceLock::new();

/// Nanoseconds since an unspecified, process-wide monotonic epoch (spec
/// §3). Built on `Instant` via [`MonotonicClock`], not wall-clock time,
/// which can jump backward on an NTP adjustment mid-run.
pub(crate) fn now_ns() -> u64 {
    // 0 is reserved by `stamp_if_unset` to mean "not yet stamped", so the
    // clock's own epoch instant (elapsed 0) is nudged to 1.
    EVENT_CLOCK.get_or_init(MonotonicClock::new).now_ns().max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_event_has_zero_timestamp_until_stamped() {
        let mut e = Event::new(EventPayload::Quit, WILDCARD_USER_PTR);
        assert_eq!(e.timestamp_ns, 0);
        e.stamp_if_unset();
        assert!(e.timestamp_ns > 0);
    }

    #[test]
    fn kind_matches_payload() {
        let e = Event::new(EventPayload::Timer, 42);
        assert_eq!(e.kind(), EventKind::Timer);
    }
}
