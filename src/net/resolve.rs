//! Name lookup collaborator (spec §6): resolve a hostname on a detached
//! worker thread, posting `NAME_LOOKUP_COMPLETE` with the result — the same
//! worker-thread-posts-a-completion-event shape as the timer (C7).

use crate::error::Error;
use crate::event::{EventPayload, UserPtr};
use crate::eventloop;
use crate::thread::{self, DetachState, ThreadAttrs};
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};

/// Resolve `host` asynchronously. The calling thread later receives a
/// `NAME_LOOKUP_COMPLETE` event carrying every IPv4 address found, or a
/// canonical error if resolution failed.
pub fn lookup_host(host: &str) -> Result<(), Error> {
    lookup_host_with(host, 0)
}

/// As [`lookup_host`], tagging the completion event with `user_ptr`.
pub fn lookup_host_with(host: &str, user_ptr: UserPtr) -> Result<(), Error> {
    let target = thread::self_handle();
    let host = host.to_string();

    thread::spawn(
        ThreadAttrs::new()
            .set_detach_state(DetachState::Detached)
            .set_debug_name("name-lookup"),
        move || {
            let result = resolve_ipv4(&host);
            eventloop::post_thread_event(
                &target,
                EventPayload::NameLookupComplete(result),
                user_ptr,
            );
            0
        },
    )?;
    Ok(())
}

fn resolve_ipv4(host: &str) -> Result<Vec<Ipv4Addr>, Error> {
    // `ToSocketAddrs` needs a port; 0 is never actually connected to.
    let addrs = (host, 0u16)
        .to_socket_addrs()
        .map_err(|_| Error::HostNotFound)?;
    let v4: Vec<Ipv4Addr> = addrs
        .filter_map(|addr| match addr {
            SocketAddr::V4(a) => Some(*a.ip()),
            SocketAddr::V6(_) => None,
        })
        .collect();
    if v4.is_empty() {
        Err(Error::HostNotFound)
    } else {
        Ok(v4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    #[test]
    fn resolving_localhost_yields_loopback() {
        thread::spawn(ThreadAttrs::new(), || {
            lookup_host("localhost").unwrap();
            // wait() sleeps its full timeout unconditionally (spec §4.5), so
            // poll with a short timeout rather than a single multi-second wait.
            let mut event = None;
            for _ in 0..200 {
                if let Some(e) = eventloop::wait(Some(10_000_000)) {
                    event = Some(e);
                    break;
                }
            }
            let event = event.expect("lookup should complete within 2s");
            assert_eq!(event.kind(), EventKind::NameLookupComplete);
            if let crate::event::EventPayload::NameLookupComplete(Ok(addrs)) = event.payload {
                assert!(addrs.contains(&Ipv4Addr::LOCALHOST));
            } else {
                panic!("expected a successful lookup");
            }
            0
        })
        .unwrap()
        .join()
        .unwrap();
    }
}
