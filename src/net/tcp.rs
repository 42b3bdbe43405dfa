//! TCP sockets (spec §6), IPv4 only (spec §1 Non-goals).

use crate::error::{self, Error};
use crate::event::{EventPayload, UserPtr};
use crate::eventloop;
use crate::sync::Mutex;
use crate::thread::{self, DetachState, ThreadAttrs};
use std::net::{SocketAddrV4, TcpListener as StdTcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

fn map(e: std::io::Error) -> Error {
    let mapped = error::map_io_error(&e);
    error::set_last_error(mapped);
    mapped
}

/// A connected (or connecting) TCP socket.
#[derive(Clone)]
pub struct TcpSocket {
    inner: Arc<Mutex<Option<TcpStream>>>,
}

impl TcpSocket {
    fn from_stream(stream: TcpStream) -> Self {
        TcpSocket {
            inner: Arc::new(Mutex::new(Some(stream))),
        }
    }

    /// Connect synchronously. For an asynchronous connect that posts
    /// `SOCKET_CONNECT_COMPLETE`, use [`connect_async`].
    pub fn connect(addr: SocketAddrV4) -> Result<TcpSocket, Error> {
        TcpStream::connect(addr).map(Self::from_stream).map_err(map)
    }

    /// Start connecting on a worker thread; the calling thread later
    /// receives a `SOCKET_CONNECT_COMPLETE` event carrying the result.
    pub fn connect_async(addr: SocketAddrV4, user_ptr: UserPtr) -> Result<TcpSocket, Error> {
        let target = thread::self_handle();
        let slot = Arc::new(Mutex::new(None));
        let worker_slot = Arc::clone(&slot);

        thread::spawn(
            ThreadAttrs::new()
                .set_detach_state(DetachState::Detached)
                .set_debug_name("tcp-connect"),
            move || {
                match TcpStream::connect(addr) {
                    Ok(stream) => {
                        *worker_slot.lock() = Some(stream);
                        eventloop::post_thread_event(
                            &target,
                            EventPayload::SocketConnectComplete(Ok(())),
                            user_ptr,
                        );
                    }
                    Err(e) => {
                        eventloop::post_thread_event(
                            &target,
                            EventPayload::SocketConnectComplete(Err(error::map_io_error(&e))),
                            user_ptr,
                        );
                    }
                }
                0
            },
        )?;

        Ok(TcpSocket { inner: slot })
    }

    pub fn read(&self, buf: &mut [u8]) -> Result<usize, Error> {
        use std::io::Read;
        let mut guard = self.inner.lock();
        let stream = guard.as_mut().ok_or(Error::NotConnected)?;
        stream.read(buf).map_err(map)
    }

    pub fn write(&self, buf: &[u8]) -> Result<usize, Error> {
        use std::io::Write;
        let mut guard = self.inner.lock();
        let stream = guard.as_mut().ok_or(Error::NotConnected)?;
        stream.write(buf).map_err(map)
    }

    /// Spawn a one-shot watcher that posts `SOCKET_READABLE` the next time
    /// a read on this socket would return data (or EOF) without blocking.
    /// Re-arm by calling this again after consuming the event.
    pub fn watch_readable(&self, user_ptr: UserPtr) -> Result<(), Error> {
        let target = thread::self_handle();
        let inner = Arc::clone(&self.inner);

        thread::spawn(
            ThreadAttrs::new()
                .set_detach_state(DetachState::Detached)
                .set_debug_name("tcp-readable"),
            move || {
                let mut probe = [0u8; 1];
                loop {
                    let peeked = {
                        let guard = inner.lock();
                        guard.as_ref().map(|s| s.peek(&mut probe))
                    };
                    match peeked {
                        Some(Ok(_)) => break,
                        Some(Err(e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                            std::thread::sleep(Duration::from_millis(5));
                        }
                        Some(Err(_)) => break,
                        None => break,
                    }
                }
                eventloop::post_thread_event(&target, EventPayload::SocketReadable, user_ptr);
                0
            },
        )?;
        Ok(())
    }

    /// A connected TCP socket's send buffer is available immediately in the
    /// common case; this posts `SOCKET_WRITABLE` right away.
    pub fn watch_writable(&self, user_ptr: UserPtr) -> Result<(), Error> {
        eventloop::post_event(EventPayload::SocketWritable, user_ptr);
        Ok(())
    }
}

/// A listening TCP socket.
pub struct TcpListener {
    inner: StdTcpListener,
    incoming: Arc<Mutex<Vec<TcpSocket>>>,
}

impl TcpListener {
    /// Bind a listening socket. Spec §6: "TCP sockets post `SOCKET_READABLE`
    /// after a successful bind" — posted to the calling thread, tagged with
    /// `user_ptr`, once the listener is actually bound.
    pub fn bind(addr: SocketAddrV4, user_ptr: UserPtr) -> Result<TcpListener, Error> {
        let inner = StdTcpListener::bind(addr).map_err(map)?;
        eventloop::post_event(EventPayload::SocketReadable, user_ptr);
        Ok(TcpListener {
            inner,
            incoming: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn accept(&self) -> Result<TcpSocket, Error> {
        self.inner
            .accept()
            .map(|(stream, _addr)| TcpSocket::from_stream(stream))
            .map_err(map)
    }

    /// Spawn a detached accept loop that posts `SOCKET_INCOMING` for every
    /// accepted connection. Call [`TcpListener::take_incoming`] from the
    /// event handler to retrieve the accepted socket.
    pub fn watch_incoming(&self, user_ptr: UserPtr) -> Result<(), Error> {
        let target = thread::self_handle();
        let listener = self.inner.try_clone().map_err(map)?;
        let incoming = Arc::clone(&self.incoming);

        thread::spawn(
            ThreadAttrs::new()
                .set_detach_state(DetachState::Detached)
                .set_debug_name("tcp-accept"),
            move || {
                for conn in listener.incoming() {
                    match conn {
                        Ok(stream) => {
                            incoming.lock().push(TcpSocket::from_stream(stream));
                            eventloop::post_thread_event(
                                &target,
                                EventPayload::SocketIncoming,
                                user_ptr,
                            );
                        }
                        Err(_) => break,
                    }
                }
                0
            },
        )?;
        Ok(())
    }

    pub fn take_incoming(&self) -> Option<TcpSocket> {
        let mut guard = self.incoming.lock();
        if guard.is_empty() {
            None
        } else {
            Some(guard.remove(0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn connect_to_listener_succeeds() {
        // bind() posts SOCKET_READABLE to the calling thread, so it needs a
        // live runtime context.
        crate::thread::spawn(crate::thread::ThreadAttrs::new(), || {
            let listener =
                TcpListener::bind(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0), 0).unwrap();
            let readable = eventloop::wait(Some(0)).expect("readable event queued at bind");
            assert_eq!(readable.kind(), crate::event::EventKind::SocketReadable);

            let addr = match listener.inner.local_addr().unwrap() {
                std::net::SocketAddr::V4(a) => a,
                _ => unreachable!(),
            };

            let accept_thread = std::thread::spawn(move || listener.accept());
            let client = TcpSocket::connect(addr).unwrap();
            let server = accept_thread.join().unwrap().unwrap();

            client.write(b"ping").unwrap();
            let mut buf = [0u8; 4];
            assert_eq!(server.read(&mut buf).unwrap(), 4);
            assert_eq!(&buf, b"ping");
            0
        })
        .unwrap()
        .join()
        .unwrap();
    }

    #[test]
    fn connect_to_closed_port_fails() {
        // Port 0 never accepts connections directly; use an address nothing
        // listens on instead, relying on immediate refusal on loopback.
        let addr = SocketAddrV4::new(Ipv4Addr::LOCALHOST, 1);
        assert!(TcpSocket::connect(addr).is_err());
    }
}
