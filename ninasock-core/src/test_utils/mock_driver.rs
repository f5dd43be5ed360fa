//! Mock driver implementation for testing.
//!
//! This module provides an in-memory driver that can be used in tests to simulate the chip
//! without any hardware.

use core::{cell::RefCell, net::SocketAddrV4};
use std::collections::VecDeque;

use crate::{
    driver::{Accepted, Completion, Driver},
    errno,
    socket::{IoControl, Protocol, State, Type},
};

/// Mock driver implementation for testing.
///
/// Hands out handles from `0` upwards, up to a fixed number of open sockets. Sent data is
/// recorded, received data and incoming connections are pre-loaded by the test. Failures are
/// injected with [`MockDriver::fail_next`].
#[derive(Debug)]
#[doc(hidden)]
pub struct MockDriver {
    inner: RefCell<Inner>,
}

#[derive(Debug)]
struct Inner {
    capacity: usize,
    next_handle: u8,
    open: Vec<u8>,
    closed: Vec<u8>,
    nonblocking: Vec<u8>,
    fail_next: Option<u8>,
    peers: VecDeque<SocketAddrV4>,
    connected: Vec<(u8, SocketAddrV4)>,
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    send_limit: usize,
    inflate: u16,
    nread: Option<i32>,
    invalid_accept: Option<u8>,
    state: State,
}

impl MockDriver {
    /// Create a new mock driver allowing `capacity` sockets open at the same time.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RefCell::new(Inner {
                capacity,
                next_handle: 0,
                open: Vec::new(),
                closed: Vec::new(),
                nonblocking: Vec::new(),
                fail_next: None,
                peers: VecDeque::new(),
                connected: Vec::new(),
                rx: VecDeque::new(),
                tx: Vec::new(),
                send_limit: usize::MAX,
                inflate: 0,
                nread: None,
                invalid_accept: None,
                state: State::WRITABLE,
            }),
        }
    }

    /// Make the next primitive (other than `close`) fail with the given error code.
    pub fn fail_next(&self, error: u8) {
        self.inner.borrow_mut().fail_next = Some(error);
    }

    /// Queue an incoming connection from `peer`.
    pub fn queue_peer(&self, peer: SocketAddrV4) {
        self.inner.borrow_mut().peers.push_back(peer);
    }

    /// Pre-load data to be received.
    pub fn feed(&self, data: &[u8]) {
        self.inner.borrow_mut().rx.extend(data.iter().copied());
    }

    /// Only accept up to `limit` bytes per send.
    pub fn limit_send(&self, limit: usize) {
        self.inner.borrow_mut().send_limit = limit;
    }

    /// Over-report every transfer count by `extra` bytes, like a misbehaving driver.
    pub fn inflate_counts(&self, extra: u16) {
        self.inner.borrow_mut().inflate = extra;
    }

    /// Report `count` for every `NREAD` request instead of the buffered amount.
    pub fn force_nread(&self, count: i32) {
        self.inner.borrow_mut().nread = Some(count);
    }

    /// Make the next `accept` hand out the invalid handle along with the given error code.
    pub fn accept_invalid(&self, error: u8) {
        self.inner.borrow_mut().invalid_accept = Some(error);
    }

    /// Set the state reported by `poll`.
    pub fn set_state(&self, state: State) {
        self.inner.borrow_mut().state = state;
    }

    /// All data that has been sent.
    pub fn sent(&self) -> Vec<u8> {
        self.inner.borrow().tx.clone()
    }

    /// The handles passed to `close`, in call order.
    pub fn closed(&self) -> Vec<u8> {
        self.inner.borrow().closed.clone()
    }

    /// If the handle is currently open.
    pub fn is_open(&self, handle: u8) -> bool {
        self.inner.borrow().open.contains(&handle)
    }

    /// If the handle is in non-blocking mode.
    pub fn is_nonblocking(&self, handle: u8) -> bool {
        self.inner.borrow().nonblocking.contains(&handle)
    }

    /// The remote endpoint the handle was connected to.
    pub fn remote_of(&self, handle: u8) -> Option<SocketAddrV4> {
        self.inner
            .borrow()
            .connected
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, remote)| *remote)
    }
}

impl Inner {
    /// Consume an injected failure, then check the handle.
    fn begin(&mut self, handle: u8) -> Result<(), u8> {
        if let Some(error) = self.fail_next.take() {
            return Err(error);
        }
        if !self.open.contains(&handle) {
            return Err(errno::EBADF);
        }

        Ok(())
    }

    fn allocate(&mut self) -> Result<u8, u8> {
        if self.open.len() >= self.capacity {
            return Err(errno::ENFILE);
        }
        let handle = self.next_handle;
        self.next_handle += 1;
        self.open.push(handle);

        Ok(handle)
    }

    fn would_block_code(&self, handle: u8) -> Option<u8> {
        self.nonblocking
            .contains(&handle)
            .then_some(errno::EWOULDBLOCK)
    }
}

impl Driver for MockDriver {
    fn socket(&self, _kind: Type, _protocol: Protocol) -> Completion<u8> {
        let mut inner = self.inner.borrow_mut();
        if let Some(error) = inner.fail_next.take() {
            return Completion::failed(crate::INVALID_HANDLE, error);
        }

        match inner.allocate() {
            Ok(handle) => Completion::ok(handle),
            Err(error) => Completion::failed(crate::INVALID_HANDLE, error),
        }
    }

    fn close(&self, handle: u8) -> Completion<()> {
        let mut inner = self.inner.borrow_mut();
        inner.closed.push(handle);
        match inner.open.iter().position(|h| *h == handle) {
            Some(pos) => {
                inner.open.remove(pos);
                inner.nonblocking.retain(|h| *h != handle);
                Completion::ok(())
            }
            None => Completion::failed((), errno::EBADF),
        }
    }

    fn bind(&self, handle: u8, _port: u16) -> Completion<bool> {
        match self.inner.borrow_mut().begin(handle) {
            Ok(()) => Completion::ok(true),
            Err(error) => Completion::failed(false, error),
        }
    }

    fn listen(&self, handle: u8, _backlog: u8) -> Completion<bool> {
        match self.inner.borrow_mut().begin(handle) {
            Ok(()) => Completion::ok(true),
            Err(error) => Completion::failed(false, error),
        }
    }

    fn accept(&self, handle: u8) -> Completion<Option<Accepted>> {
        let mut inner = self.inner.borrow_mut();
        if let Err(error) = inner.begin(handle) {
            return Completion::failed(None, error);
        }
        if let Some(error) = inner.invalid_accept.take() {
            let remote = inner.peers.front().copied().unwrap_or(SocketAddrV4::new(
                core::net::Ipv4Addr::UNSPECIFIED,
                0,
            ));
            let accepted = Accepted {
                handle: crate::INVALID_HANDLE,
                remote,
            };
            return Completion::failed(Some(accepted), error);
        }
        let Some(remote) = inner.peers.pop_front() else {
            let error = inner.would_block_code(handle).unwrap_or(errno::ECONNABORTED);
            return Completion::failed(None, error);
        };

        match inner.allocate() {
            Ok(handle) => {
                inner.connected.push((handle, remote));
                Completion::ok(Some(Accepted { handle, remote }))
            }
            Err(error) => Completion::failed(None, error),
        }
    }

    fn connect(&self, handle: u8, remote: SocketAddrV4) -> Completion<bool> {
        let mut inner = self.inner.borrow_mut();
        if let Err(error) = inner.begin(handle) {
            return Completion::failed(false, error);
        }
        inner.connected.push((handle, remote));

        Completion::ok(true)
    }

    fn send(&self, handle: u8, buf: &[u8]) -> Completion<u16> {
        let mut inner = self.inner.borrow_mut();
        if let Err(error) = inner.begin(handle) {
            return Completion::failed(0, error);
        }
        let len = buf.len().min(inner.send_limit);
        inner.tx.extend_from_slice(&buf[..len]);

        Completion::ok((len as u16).saturating_add(inner.inflate))
    }

    fn recv(&self, handle: u8, buf: &mut [u8]) -> Completion<u16> {
        let mut inner = self.inner.borrow_mut();
        if let Err(error) = inner.begin(handle) {
            return Completion::failed(0, error);
        }
        if inner.rx.is_empty() {
            return match inner.would_block_code(handle) {
                Some(error) => Completion::failed(0, error),
                None => Completion::ok(0),
            };
        }

        let len = buf.len().min(inner.rx.len());
        for (dst, src) in buf.iter_mut().zip(inner.rx.drain(..len)) {
            *dst = src;
        }

        Completion::ok((len as u16).saturating_add(inner.inflate))
    }

    fn ioctl(&self, handle: u8, request: u32, arg: &mut [u8]) -> Completion<usize> {
        let mut inner = self.inner.borrow_mut();
        if let Err(error) = inner.begin(handle) {
            return Completion::failed(0, error);
        }
        let Ok(arg) = <&mut [u8; 4]>::try_from(arg) else {
            return Completion::failed(0, errno::EINVAL);
        };

        match IoControl::try_from(request) {
            Ok(IoControl::NonBlockingIo) => {
                inner.nonblocking.retain(|h| *h != handle);
                if u32::from_le_bytes(*arg) != 0 {
                    inner.nonblocking.push(handle);
                }
            }
            Ok(IoControl::NRead) => {
                let count = inner.nread.unwrap_or(inner.rx.len() as i32);
                *arg = count.to_le_bytes();
            }
            Err(e) => return Completion::failed(0, e.code()),
        }

        Completion::ok(arg.len())
    }

    fn poll(&self, handle: u8) -> Completion<Option<State>> {
        let mut inner = self.inner.borrow_mut();
        if let Err(error) = inner.begin(handle) {
            return Completion::failed(None, error);
        }
        let mut state = inner.state;
        if !inner.rx.is_empty() || !inner.peers.is_empty() {
            state |= State::READABLE;
        }

        Completion::ok(Some(state))
    }
}
