//! Callback registry (C5): per-thread table mapping `(kind, user_ptr)`
//! pairs to handler functions, scanned in insertion order.
//!
//! Lives entirely in thread-local storage — spec §3: "per-thread callback
//! table: read/written only by the owning thread; not shared" — so no
//! locking is needed here at all, unlike the event queue it sits next to.

use crate::event::{Event, EventKind, UserPtr};

pub type CallbackFn = Box<dyn FnMut(&Event)>;

struct CallbackRecord {
    kind_filter: Option<EventKind>,
    user_ptr: UserPtr,
    handler: CallbackFn,
}

/// Insertion-ordered table of registered callbacks for one thread.
#[derive(Default)]
pub struct CallbackRegistry {
    entries: Vec<CallbackRecord>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        CallbackRegistry {
            entries: Vec::new(),
        }
    }

    /// Register a handler for `(kind_filter, user_ptr)`. `kind_filter =
    /// None` matches any event kind (spec §4.4's `kind == 0` wildcard). A
    /// registration with a matching key replaces the existing handler in
    /// place rather than appending a duplicate (TC-2); passing `handler =
    /// None` logically removes the registration.
    pub fn install(
        &mut self,
        kind_filter: Option<EventKind>,
        user_ptr: UserPtr,
        handler: Option<CallbackFn>,
    ) {
        let existing = self
            .entries
            .iter_mut()
            .find(|e| e.kind_filter == kind_filter && e.user_ptr == user_ptr);

        match (existing, handler) {
            (Some(entry), Some(f)) => entry.handler = f,
            (Some(_), None) => {
                self.entries
                    .retain(|e| !(e.kind_filter == kind_filter && e.user_ptr == user_ptr));
            }
            (None, Some(f)) => self.entries.push(CallbackRecord {
                kind_filter,
                user_ptr,
                handler: f,
            }),
            (None, None) => {}
        }
    }

    /// Try to dispatch `event` to the first matching callback (insertion
    /// order, first match wins). Returns `true` if a callback consumed the
    /// event.
    pub fn try_dispatch(&mut self, event: &Event) -> bool {
        for entry in self.entries.iter_mut() {
            let kind_matches = match entry.kind_filter {
                None => true,
                Some(k) => k == event.kind(),
            };
            if kind_matches && entry.user_ptr == event.user_ptr {
                (entry.handler)(event);
                return true;
            }
        }
        false
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventPayload, WILDCARD_USER_PTR};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn reregistering_same_key_replaces_not_grows() {
        let mut reg = CallbackRegistry::new();
        reg.install(
            Some(EventKind::Quit),
            WILDCARD_USER_PTR,
            Some(Box::new(|_| {})),
        );
        assert_eq!(reg.len(), 1);
        reg.install(
            Some(EventKind::Quit),
            WILDCARD_USER_PTR,
            Some(Box::new(|_| {})),
        );
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn null_handler_removes_registration() {
        let mut reg = CallbackRegistry::new();
        reg.install(
            Some(EventKind::Quit),
            WILDCARD_USER_PTR,
            Some(Box::new(|_| {})),
        );
        reg.install(Some(EventKind::Quit), WILDCARD_USER_PTR, None);
        assert!(reg.is_empty());
    }

    #[test]
    fn wildcard_matches_any_kind() {
        let flag = Rc::new(RefCell::new(false));
        let flag2 = Rc::clone(&flag);
        let mut reg = CallbackRegistry::new();
        reg.install(
            None,
            WILDCARD_USER_PTR,
            Some(Box::new(move |_| *flag2.borrow_mut() = true)),
        );
        let event = Event::new(EventPayload::Quit, WILDCARD_USER_PTR);
        assert!(reg.try_dispatch(&event));
        assert!(*flag.borrow());
    }

    #[test]
    fn first_match_wins_and_consumes() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let o1 = Rc::clone(&order);
        let o2 = Rc::clone(&order);
        let mut reg = CallbackRegistry::new();
        reg.install(
            Some(EventKind::Quit),
            WILDCARD_USER_PTR,
            Some(Box::new(move |_| o1.borrow_mut().push(1))),
        );
        reg.install(
            None,
            WILDCARD_USER_PTR,
            Some(Box::new(move |_| o2.borrow_mut().push(2))),
        );
        let event = Event::new(EventPayload::Quit, WILDCARD_USER_PTR);
        assert!(reg.try_dispatch(&event));
        assert_eq!(*order.borrow(), vec![1]);
    }

    #[test]
    fn non_matching_event_is_not_consumed() {
        let mut reg = CallbackRegistry::new();
        reg.install(
            Some(EventKind::Quit),
            1,
            Some(Box::new(|_| panic!("should not run"))),
        );
        let event = Event::new(EventPayload::Quit, 2);
        assert!(!reg.try_dispatch(&event));
    }
}
