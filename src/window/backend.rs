//! Per-host window backends (spec §4.7 supplement).
//!
//! `Backend` is the seam between [`super::Window`] and whatever the host
//! platform actually provides: realizing a native display/window handle
//! pair, and feeding native input/lifecycle events into the owning
//! thread's event queue through [`crate::eventloop::HostEventSource`].
//!
//! `realize()` stays `Err(Nosys)` everywhere — this crate has no GPU/X11/
//! Win32/NDK surface handle to hand back, and fabricating one would be a
//! stub pretending to be real. Input translation is a different story:
//! component C8 is core, not a Non-goal (spec §1), so [`TermiosStdinSource`]
//! gives the Unix backend a genuine, working translation path (keyboard
//! press/release and char events read straight off the controlling
//! terminal) rather than a `NullHostSource` placeholder. There is no
//! pointer device on a terminal, so pointer motion/select events are not
//! produced by this source — see DESIGN.md.

use crate::error::Error;
use crate::event::{ArrowKey, EventPayload};
use crate::eventloop::HostEventSource;
use raw_window_handle::{RawDisplayHandle, RawWindowHandle, XlibDisplayHandle, XlibWindowHandle};

pub trait Backend: Send {
    fn realize(&self) -> Result<(RawDisplayHandle, RawWindowHandle), Error>;
    fn host_source(&self) -> Box<dyn HostEventSource>;
}

/// Fully working backend used in tests and by embedders that don't need a
/// real native window (e.g. headless simulation, CI).
pub struct MockBackend;

impl Backend for MockBackend {
    fn realize(&self) -> Result<(RawDisplayHandle, RawWindowHandle), Error> {
        // Not a real display: the Xlib variant is used only because its
        // fields are plain integers with a safe `empty()` constructor, not
        // because this backend talks to X11.
        let display = RawDisplayHandle::Xlib(XlibDisplayHandle::empty());
        let window = RawWindowHandle::Xlib(XlibWindowHandle::empty());
        Ok((display, window))
    }

    fn host_source(&self) -> Box<dyn HostEventSource> {
        Box::new(crate::eventloop::MockHostSource::new())
    }
}

/// Raw-mode terminal keyboard input, translated into this crate's `Event`
/// type. Grounded on the termios save/modify/restore sequence terminal
/// libraries use to enter raw mode (disable canonical mode, echo, and
/// signal generation; read one byte at a time), reimplemented here against
/// the crate's existing `libc` dependency instead of a dedicated termios
/// crate.
#[cfg(unix)]
pub struct TermiosStdinSource {
    original: libc::termios,
}

#[cfg(unix)]
impl TermiosStdinSource {
    pub fn new() -> Self {
        let original = enable_raw_mode();
        TermiosStdinSource { original }
    }
}

#[cfg(unix)]
impl Default for TermiosStdinSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
impl Drop for TermiosStdinSource {
    fn drop(&mut self) {
        // SAFETY: STDIN_FILENO is always a valid fd for the process; restoring
        // the saved settings is the standard un-raw-mode sequence.
        unsafe {
            libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, &self.original);
        }
    }
}

/// Put stdin into raw mode (no canonical line buffering, no echo, no
/// signal-generating control characters, one byte at a time), returning the
/// previous settings so they can be restored on drop.
#[cfg(unix)]
fn enable_raw_mode() -> libc::termios {
    unsafe {
        let mut original: libc::termios = std::mem::zeroed();
        libc::tcgetattr(libc::STDIN_FILENO, &mut original);

        let mut raw = original;
        raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN);
        raw.c_iflag &= !(libc::IXON | libc::ICRNL | libc::BRKINT | libc::INPCK | libc::ISTRIP);
        raw.c_oflag &= !libc::OPOST;
        raw.c_cc[libc::VMIN] = 0;
        raw.c_cc[libc::VTIME] = 0;
        libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, &raw);

        // Non-blocking reads: VTIME=0/VMIN=0 above already makes `read`
        // return immediately with whatever is available, but stdin itself
        // may still be a blocking fd in some host shells; force O_NONBLOCK
        // too so `poll` below never stalls the thread.
        let flags = libc::fcntl(libc::STDIN_FILENO, libc::F_GETFL);
        if flags >= 0 {
            libc::fcntl(libc::STDIN_FILENO, libc::F_SETFL, flags | libc::O_NONBLOCK);
        }

        original
    }
}

#[cfg(unix)]
impl HostEventSource for TermiosStdinSource {
    fn poll(&mut self) -> Vec<crate::event::Event> {
        let mut buf = [0u8; 64];
        // SAFETY: buf is a valid, appropriately-sized buffer for the
        // duration of the call; a negative/zero return (EAGAIN, EOF) is
        // handled below without touching buf's uninitialized tail.
        let n = unsafe { libc::read(libc::STDIN_FILENO, buf.as_mut_ptr() as *mut _, buf.len()) };
        if n <= 0 {
            return Vec::new();
        }
        translate_bytes(&buf[..n as usize])
    }
}

/// Translate a chunk of raw terminal bytes into events: Ctrl-C and `q`
/// become `QUIT`; ANSI cursor escape sequences (`ESC [ A/B/C/D`) become
/// arrow-key press events (terminals don't report key-up, so no matching
/// release follows); everything else printable becomes a `KeyChar`.
#[cfg(unix)]
fn translate_bytes(bytes: &[u8]) -> Vec<crate::event::Event> {
    let mut events = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            0x03 | b'q' => {
                events.push(crate::event::Event::new(EventPayload::Quit, 0));
                i += 1;
            }
            0x1b if bytes.get(i + 1) == Some(&b'[') => {
                let code = match bytes.get(i + 2) {
                    Some(b'A') => Some(ArrowKey::Up),
                    Some(b'B') => Some(ArrowKey::Down),
                    Some(b'C') => Some(ArrowKey::Right),
                    Some(b'D') => Some(ArrowKey::Left),
                    _ => None,
                };
                match code {
                    Some(code) => {
                        events.push(crate::event::Event::new(
                            EventPayload::Key { pressed: true, code },
                            0,
                        ));
                        i += 3;
                    }
                    None => i += 1,
                }
            }
            b if b.is_ascii_graphic() || b == b' ' => {
                events.push(crate::event::Event::new(
                    EventPayload::KeyChar { ch: b as char },
                    0,
                ));
                i += 1;
            }
            _ => i += 1,
        }
    }
    events
}

#[cfg(target_os = "linux")]
pub struct LinuxX11Backend;

#[cfg(target_os = "linux")]
impl Backend for LinuxX11Backend {
    fn realize(&self) -> Result<(RawDisplayHandle, RawWindowHandle), Error> {
        Err(Error::Nosys)
    }

    fn host_source(&self) -> Box<dyn HostEventSource> {
        Box::new(TermiosStdinSource::new())
    }
}

#[cfg(target_os = "windows")]
pub struct Win32Backend;

#[cfg(target_os = "windows")]
impl Backend for Win32Backend {
    fn realize(&self) -> Result<(RawDisplayHandle, RawWindowHandle), Error> {
        Err(Error::Nosys)
    }

    fn host_source(&self) -> Box<dyn HostEventSource> {
        Box::new(crate::eventloop::NullHostSource)
    }
}

#[cfg(target_os = "android")]
pub struct AndroidBackend;

#[cfg(target_os = "android")]
impl Backend for AndroidBackend {
    fn realize(&self) -> Result<(RawDisplayHandle, RawWindowHandle), Error> {
        Err(Error::Nosys)
    }

    fn host_source(&self) -> Box<dyn HostEventSource> {
        Box::new(crate::eventloop::NullHostSource)
    }
}

/// Select the backend for the running host: the real per-target backend
/// unless the `mock-backend` feature forces [`MockBackend`], or no real
/// backend is structured for this target at all (both cases fall back to
/// it). `realize()` is `Error::Nosys` on every real-OS backend (no GPU/X11/
/// Win32/NDK handle to hand back); `LinuxX11Backend::host_source` is a
/// genuine translation path (see [`TermiosStdinSource`]), Win32/Android's
/// remain `NullHostSource` stubs — see DESIGN.md.
#[cfg(feature = "mock-backend")]
pub fn current_backend() -> Box<dyn Backend> {
    Box::new(MockBackend)
}

#[cfg(all(not(feature = "mock-backend"), target_os = "linux"))]
pub fn current_backend() -> Box<dyn Backend> {
    Box::new(LinuxX11Backend)
}

#[cfg(all(not(feature = "mock-backend"), target_os = "windows"))]
pub fn current_backend() -> Box<dyn Backend> {
    Box::new(Win32Backend)
}

#[cfg(all(not(feature = "mock-backend"), target_os = "android"))]
pub fn current_backend() -> Box<dyn Backend> {
    Box::new(AndroidBackend)
}

#[cfg(all(
    not(feature = "mock-backend"),
    not(any(target_os = "linux", target_os = "windows", target_os = "android"))
))]
pub fn current_backend() -> Box<dyn Backend> {
    Box::new(MockBackend)
}
