//! UDP sockets (spec §6), IPv4 only (spec §1 Non-goals).

use crate::error::{self, Error};
use crate::event::{EventPayload, UserPtr};
use crate::eventloop;
use crate::thread::{self, DetachState, ThreadAttrs};
use std::net::{SocketAddrV4, UdpSocket as StdUdpSocket};
use std::time::Duration;

fn map(e: std::io::Error) -> Error {
    let mapped = error::map_io_error(&e);
    error::set_last_error(mapped);
    mapped
}

pub struct UdpSocket {
    inner: StdUdpSocket,
}

impl UdpSocket {
    /// Bind a UDP socket. Spec §6: "UDP sockets are considered readable
    /// immediately after create" — a successful bind posts `SOCKET_READABLE`
    /// to the calling thread right away, tagged with `user_ptr`.
    pub fn bind(addr: SocketAddrV4, user_ptr: UserPtr) -> Result<UdpSocket, Error> {
        let inner = StdUdpSocket::bind(addr).map_err(map)?;
        eventloop::post_event(EventPayload::SocketReadable, user_ptr);
        Ok(UdpSocket { inner })
    }

    pub fn send_to(&self, buf: &[u8], addr: SocketAddrV4) -> Result<usize, Error> {
        self.inner.send_to(buf, addr).map_err(map)
    }

    pub fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddrV4), Error> {
        let (n, addr) = self.inner.recv_from(buf).map_err(map)?;
        match addr {
            std::net::SocketAddr::V4(v4) => Ok((n, v4)),
            std::net::SocketAddr::V6(_) => Err(Error::AfUnsupported),
        }
    }

    /// Spawn a one-shot watcher that posts `SOCKET_READABLE` the next time a
    /// datagram is waiting. Re-arm by calling this again after consuming it.
    pub fn watch_readable(&self, user_ptr: UserPtr) -> Result<(), Error> {
        let target = thread::self_handle();
        let socket = self.inner.try_clone().map_err(map)?;

        thread::spawn(
            ThreadAttrs::new()
                .set_detach_state(DetachState::Detached)
                .set_debug_name("udp-readable"),
            move || {
                socket
                    .set_read_timeout(Some(Duration::from_millis(5)))
                    .ok();
                let mut probe = [0u8; 1];
                loop {
                    match socket.peek(&mut probe) {
                        Ok(_) => break,
                        Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => continue,
                        Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
                        Err(_) => break,
                    }
                }
                eventloop::post_thread_event(&target, EventPayload::SocketReadable, user_ptr);
                0
            },
        )?;
        Ok(())
    }
}
