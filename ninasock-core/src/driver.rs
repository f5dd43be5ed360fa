//! The low-level socket driver trait.

use core::net::SocketAddrV4;

use crate::socket::{Protocol, State, Type};

/// The socket driver trait.
///
/// This is the trait that needs to be implemented for a type to provide sockets, typically by
/// talking to the network co-processor over SPI. Every primitive addresses a socket by its raw
/// handle and returns its result together with the error code it produced.
///
/// Methods take `&self`: the link to the chip is shared by all sockets, so implementations are
/// expected to use interior mutability.
///
/// Notes for implementers:
///
/// * The error code of a successful primitive must be `0`.
/// * Stack errors must be lwIP `errno` values, i-e below [`crate::errno::SPI_FAILURE`], which is
///   reserved for failures to reach the chip.
/// * Handle `255` ([`crate::INVALID_HANDLE`]) is never a valid socket.
pub trait Driver {
    /// Create a socket.
    ///
    /// Returns the new handle, or [`crate::INVALID_HANDLE`] on failure.
    fn socket(&self, kind: Type, protocol: Protocol) -> Completion<u8>;

    /// Release a socket.
    fn close(&self, handle: u8) -> Completion<()>;

    /// Bind a socket to a local port.
    fn bind(&self, handle: u8, port: u16) -> Completion<bool>;

    /// Start listening for incoming connections.
    fn listen(&self, handle: u8, backlog: u8) -> Completion<bool>;

    /// Accept an incoming connection.
    fn accept(&self, handle: u8) -> Completion<Option<Accepted>>;

    /// Connect a socket to a remote endpoint.
    fn connect(&self, handle: u8, remote: SocketAddrV4) -> Completion<bool>;

    /// Send data.
    ///
    /// `buf` is never longer than `u16::MAX`. Returns the number of bytes sent.
    fn send(&self, handle: u8, buf: &[u8]) -> Completion<u16>;

    /// Receive data.
    ///
    /// `buf` is never longer than `u16::MAX`. Returns the number of bytes received.
    fn recv(&self, handle: u8, buf: &mut [u8]) -> Completion<u16>;

    /// Issue an I/O control request.
    ///
    /// `request` is one of the [`crate::IoControl`] codes and `arg` its in/out argument, in
    /// little-endian byte order. Returns the size of the result, `0` on failure.
    fn ioctl(&self, handle: u8, request: u32, arg: &mut [u8]) -> Completion<usize>;

    /// Query the socket state, similar to `select()` on a single socket.
    fn poll(&self, handle: u8) -> Completion<Option<State>>;
}

impl<D: Driver + ?Sized> Driver for &D {
    fn socket(&self, kind: Type, protocol: Protocol) -> Completion<u8> {
        (**self).socket(kind, protocol)
    }

    fn close(&self, handle: u8) -> Completion<()> {
        (**self).close(handle)
    }

    fn bind(&self, handle: u8, port: u16) -> Completion<bool> {
        (**self).bind(handle, port)
    }

    fn listen(&self, handle: u8, backlog: u8) -> Completion<bool> {
        (**self).listen(handle, backlog)
    }

    fn accept(&self, handle: u8) -> Completion<Option<Accepted>> {
        (**self).accept(handle)
    }

    fn connect(&self, handle: u8, remote: SocketAddrV4) -> Completion<bool> {
        (**self).connect(handle, remote)
    }

    fn send(&self, handle: u8, buf: &[u8]) -> Completion<u16> {
        (**self).send(handle, buf)
    }

    fn recv(&self, handle: u8, buf: &mut [u8]) -> Completion<u16> {
        (**self).recv(handle, buf)
    }

    fn ioctl(&self, handle: u8, request: u32, arg: &mut [u8]) -> Completion<usize> {
        (**self).ioctl(handle, request, arg)
    }

    fn poll(&self, handle: u8) -> Completion<Option<State>> {
        (**self).poll(handle)
    }
}

/// The result of a driver primitive, paired with the error code it left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion<T> {
    /// The value the primitive returned.
    pub value: T,
    /// The error code, `0` on success.
    pub error: u8,
}

impl<T> Completion<T> {
    /// A successful completion.
    pub fn ok(value: T) -> Self {
        Self { value, error: 0 }
    }

    /// A completion carrying an error code along with the failure value of the primitive.
    pub fn failed(value: T, error: u8) -> Self {
        Self { value, error }
    }
}

/// A connection returned by [`Driver::accept`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accepted {
    /// The handle of the new socket.
    pub handle: u8,
    /// The address of the remote client.
    pub remote: SocketAddrV4,
}

/// Documentation-only driver implementation for doc tests.
///
/// This type exists only to make doc tests compile and should never be used in real code.
#[doc(hidden)]
pub mod impl_for_doc {
    use super::{Accepted, Completion, Protocol, SocketAddrV4, State, Type};

    /// A mock driver for documentation examples.
    #[derive(Debug)]
    pub struct Driver;

    impl super::Driver for Driver {
        fn socket(&self, _kind: Type, _protocol: Protocol) -> Completion<u8> {
            unreachable!("This is only for doc tests")
        }

        fn close(&self, _handle: u8) -> Completion<()> {
            unreachable!("This is only for doc tests")
        }

        fn bind(&self, _handle: u8, _port: u16) -> Completion<bool> {
            unreachable!("This is only for doc tests")
        }

        fn listen(&self, _handle: u8, _backlog: u8) -> Completion<bool> {
            unreachable!("This is only for doc tests")
        }

        fn accept(&self, _handle: u8) -> Completion<Option<Accepted>> {
            unreachable!("This is only for doc tests")
        }

        fn connect(&self, _handle: u8, _remote: SocketAddrV4) -> Completion<bool> {
            unreachable!("This is only for doc tests")
        }

        fn send(&self, _handle: u8, _buf: &[u8]) -> Completion<u16> {
            unreachable!("This is only for doc tests")
        }

        fn recv(&self, _handle: u8, _buf: &mut [u8]) -> Completion<u16> {
            unreachable!("This is only for doc tests")
        }

        fn ioctl(&self, _handle: u8, _request: u32, _arg: &mut [u8]) -> Completion<usize> {
            unreachable!("This is only for doc tests")
        }

        fn poll(&self, _handle: u8) -> Completion<Option<State>> {
            unreachable!("This is only for doc tests")
        }
    }
}
