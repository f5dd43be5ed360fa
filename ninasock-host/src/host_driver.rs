use std::{cell::RefCell, net::SocketAddrV4};

use ninasock_core::{
    driver::{Accepted, Completion, Driver},
    errno, IoControl, Protocol, State, Type, INVALID_HANDLE,
};
use tracing::{debug, trace};

use crate::entry::Entry;

/// The number of sockets the firmware can have open at the same time.
const DEFAULT_CAPACITY: usize = 10;

/// A [`Driver`] running on the host, backed by OS sockets.
///
/// Every primitive runs the OS primitive of the same name, so failures surface on the call that
/// caused them. It emulates the firmware's handle table: handles are the lowest free slot, the number of open
/// sockets is bounded and errors are reported as lwIP `errno` codes. This allows code written
/// against [`ninasock_core::Socket`] to run, and be tested, on a desktop machine.
///
/// Only IPv4 TCP and UDP sockets are supported.
#[derive(Debug)]
pub struct HostDriver {
    table: RefCell<Vec<Option<Entry>>>,
}

impl HostDriver {
    /// Create a driver with the firmware's default socket limit.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a driver allowing up to `capacity` open sockets.
    ///
    /// `capacity` is clamped to 255, as handle `255` means "no socket".
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.min(usize::from(INVALID_HANDLE));
        let table = std::iter::repeat_with(|| None).take(capacity).collect();

        Self {
            table: RefCell::new(table),
        }
    }

    /// The number of open sockets.
    pub fn open_sockets(&self) -> usize {
        self.table.borrow().iter().filter(|e| e.is_some()).count()
    }

    fn insert(&self, entry: Entry) -> Option<u8> {
        let mut table = self.table.borrow_mut();
        let (slot, free) = table.iter_mut().enumerate().find(|(_, e)| e.is_none())?;
        *free = Some(entry);

        u8::try_from(slot).ok()
    }

    /// Run `op` on the entry of `handle`, turning its outcome into a completion.
    fn run<T, F>(&self, handle: u8, failure: T, op: F) -> Completion<T>
    where
        F: FnOnce(&mut Entry) -> Result<T, u8>,
    {
        let mut table = self.table.borrow_mut();
        let res = match table.get_mut(usize::from(handle)) {
            Some(Some(entry)) => op(entry),
            _ => Err(errno::EBADF),
        };

        match res {
            Ok(value) => Completion::ok(value),
            Err(error) => {
                trace!("handle {handle}: failed with errno {error}");
                Completion::failed(failure, error)
            }
        }
    }
}

impl Default for HostDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for HostDriver {
    fn socket(&self, kind: Type, protocol: Protocol) -> Completion<u8> {
        let supported = matches!(
            (kind, protocol),
            (Type::Stream, Protocol::Tcp | Protocol::Ip) | (Type::DGram, Protocol::Udp | Protocol::Ip)
        );
        if !supported {
            debug!("unsupported socket {kind:?}/{protocol:?}");
            return Completion::failed(INVALID_HANDLE, errno::EPROTONOSUPPORT);
        }

        let entry = match Entry::new(kind) {
            Ok(entry) => entry,
            Err(error) => return Completion::failed(INVALID_HANDLE, error),
        };

        match self.insert(entry) {
            Some(handle) => {
                debug!("handle {handle}: new {kind:?} socket");
                Completion::ok(handle)
            }
            None => Completion::failed(INVALID_HANDLE, errno::ENFILE),
        }
    }

    fn close(&self, handle: u8) -> Completion<()> {
        let entry = self
            .table
            .borrow_mut()
            .get_mut(usize::from(handle))
            .and_then(Option::take);

        match entry {
            Some(_) => {
                debug!("handle {handle}: closed");
                Completion::ok(())
            }
            None => Completion::failed((), errno::EBADF),
        }
    }

    fn bind(&self, handle: u8, port: u16) -> Completion<bool> {
        self.run(handle, false, |entry| entry.bind(port).map(|_| true))
    }

    fn listen(&self, handle: u8, backlog: u8) -> Completion<bool> {
        self.run(handle, false, |entry| entry.listen(backlog).map(|_| true))
    }

    fn accept(&self, handle: u8) -> Completion<Option<Accepted>> {
        let accepted = self.run(handle, None, |entry| entry.accept().map(Some));
        let Some((socket, remote)) = accepted.value else {
            return Completion::failed(None, accepted.error);
        };
        let entry = match Entry::accepted(socket) {
            Ok(entry) => entry,
            Err(error) => return Completion::failed(None, error),
        };

        match self.insert(entry) {
            Some(new) => {
                debug!("handle {handle}: accepted handle {new} from {remote}");
                Completion::ok(Some(Accepted {
                    handle: new,
                    remote,
                }))
            }
            // The connection is dropped, as the firmware does when out of sockets.
            None => Completion::failed(None, errno::ENFILE),
        }
    }

    fn connect(&self, handle: u8, remote: SocketAddrV4) -> Completion<bool> {
        self.run(handle, false, |entry| entry.connect(remote).map(|_| true))
    }

    fn send(&self, handle: u8, buf: &[u8]) -> Completion<u16> {
        self.run(handle, 0, |entry| entry.send(buf).map(clamp))
    }

    fn recv(&self, handle: u8, buf: &mut [u8]) -> Completion<u16> {
        self.run(handle, 0, |entry| entry.recv(buf).map(clamp))
    }

    fn ioctl(&self, handle: u8, request: u32, arg: &mut [u8]) -> Completion<usize> {
        self.run(handle, 0, |entry| {
            let arg = <&mut [u8; 4]>::try_from(arg).map_err(|_| errno::EINVAL)?;
            match IoControl::try_from(request).map_err(|e| e.code())? {
                IoControl::NonBlockingIo => entry.set_nonblocking(u32::from_le_bytes(*arg) != 0)?,
                IoControl::NRead => {
                    let available = i32::try_from(entry.available()?).unwrap_or(i32::MAX);
                    *arg = available.to_le_bytes();
                }
            }

            Ok(arg.len())
        })
    }

    fn poll(&self, handle: u8) -> Completion<Option<State>> {
        self.run(handle, None, |entry| entry.poll().map(Some))
    }
}

fn clamp(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}
