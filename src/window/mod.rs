//! Window bridge (C8): a single, process-wide window, owned by whichever
//! thread creates it.

mod backend;

pub use backend::Backend;
pub use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

use crate::error::{self, Error};
use crate::event::EventPayload;
use crate::eventloop;
use crate::thread::{self, ThreadId};
use parking_lot::Mutex;

struct WindowState {
    creator: ThreadId,
    backend: Box<dyn backend::Backend>,
    title: String,
    size: (u32, u32),
    fullscreen: bool,
}

static WINDOW: Mutex<Option<WindowState>> = Mutex::new(None);

/// A property changeable on the live window (spec §4.7). `set_property`
/// posts `WINDOW_PROPERTY_CHANGE` to the creator thread on every change.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowProperty {
    Title(String),
    Size { width: u32, height: u32 },
    Fullscreen(bool),
}

/// Handle to the process's one window. Only the thread that created it may
/// realize, reconfigure, or destroy it (TW-2).
pub struct Window {
    _private: (),
}

impl Window {
    /// Create the process's window. Fails with `Error::Access` if one
    /// already exists (TW-1) — "PERMISSION_DENIED" in spec §4.7's wording,
    /// mapped onto the canonical taxonomy's closest kind; see DESIGN.md.
    pub fn create() -> Result<Window, Error> {
        let mut guard = WINDOW.lock();
        if guard.is_some() {
            error::set_last_error(Error::Access);
            return Err(Error::Access);
        }
        *guard = Some(WindowState {
            creator: thread::self_handle().id(),
            backend: backend::current_backend(),
            title: String::new(),
            size: (0, 0),
            fullscreen: false,
        });
        drop(guard);

        eventloop::set_host_source(WINDOW.lock().as_ref().unwrap().backend.host_source());
        Ok(Window { _private: () })
    }

    fn require_creator(&self) -> Result<(), Error> {
        let guard = WINDOW.lock();
        match guard.as_ref() {
            Some(state) if state.creator == thread::self_handle().id() => Ok(()),
            Some(_) => {
                error::set_last_error(Error::Perm);
                Err(Error::Perm)
            }
            None => {
                error::set_last_error(Error::Invalid);
                Err(Error::Invalid)
            }
        }
    }

    /// Destroy the window. Fails with `Error::Perm` if called from a thread
    /// other than the one that created it (TW-2).
    pub fn destroy(self) -> Result<(), Error> {
        self.require_creator()?;
        *WINDOW.lock() = None;
        Ok(())
    }

    /// Obtain the native display/window handle pair for a graphics-init
    /// library (e.g. an EGL binding) to consume.
    pub fn realize(&self) -> Result<(RawDisplayHandle, RawWindowHandle), Error> {
        self.require_creator()?;
        WINDOW.lock().as_ref().unwrap().backend.realize()
    }

    /// Change a property of the window, posting `WINDOW_PROPERTY_CHANGE` to
    /// the creator thread. The new value is stored and readable back via
    /// [`Window::title`], [`Window::size`], or [`Window::fullscreen`].
    pub fn set_property(&self, property: WindowProperty) -> Result<(), Error> {
        self.require_creator()?;
        let mut guard = WINDOW.lock();
        let state = guard.as_mut().unwrap();
        match property {
            WindowProperty::Title(title) => state.title = title,
            WindowProperty::Size { width, height } => state.size = (width, height),
            WindowProperty::Fullscreen(on) => state.fullscreen = on,
        }
        drop(guard);
        eventloop::post_event(EventPayload::WindowPropertyChange, 0);
        Ok(())
    }

    /// Current caption (spec §4.7's "property getters/setters (size,
    /// caption)"). Empty until set.
    pub fn title(&self) -> Result<String, Error> {
        self.require_creator()?;
        Ok(WINDOW.lock().as_ref().unwrap().title.clone())
    }

    /// Current `(width, height)`. `(0, 0)` until set.
    pub fn size(&self) -> Result<(u32, u32), Error> {
        self.require_creator()?;
        Ok(WINDOW.lock().as_ref().unwrap().size)
    }

    /// Current fullscreen state. `false` until set.
    pub fn fullscreen(&self) -> Result<bool, Error> {
        self.require_creator()?;
        Ok(WINDOW.lock().as_ref().unwrap().fullscreen)
    }
}
