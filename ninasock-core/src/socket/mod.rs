//! Contains the socket API.

mod kind;
pub use kind::{Protocol, Type};
mod state;
pub use state::{IoControl, State};

use core::{fmt, net::SocketAddrV4};

use crate::{driver::Driver, Error, Interface, Result};

/// The handle value of an invalid socket.
pub const INVALID_HANDLE: u8 = 255;

/// The most bytes offered to the driver in one send or receive call.
const MAX_TRANSFER: usize = u16::MAX as usize;

/// A plain socket.
///
/// The socket owns the underlying handle and closes it when dropped. It can be moved but not
/// cloned, so exactly one `Socket` owns a given handle at a time. Assigning a socket over another
/// one closes the socket that was overwritten.
///
/// A socket is either valid, owning a handle, or invalid, representing "no socket". A valid socket
/// never becomes invalid unless it is closed or its handle is moved out with [`Socket::take`] or
/// [`Socket::into_raw`]. Similarly an invalid socket never becomes valid unless it is overwritten
/// by a valid one. Failed operations leave the validity untouched.
///
/// Every operation is forwarded to the [`Driver`] of the [`Interface`] the socket was created
/// from, and refreshes the [`Interface::last_error`] code.
pub struct Socket<'i, D: Driver> {
    iface: &'i Interface<D>,
    handle: u8,
}

impl<'i, D> Socket<'i, D>
where
    D: Driver,
{
    /// Create a socket.
    ///
    /// This is equivalent to the `socket()` call. In case of failure the socket is created as
    /// invalid, which can be tested with [`Socket::is_valid`].
    pub fn new(iface: &'i Interface<D>, kind: Type, protocol: Protocol) -> Self {
        let (handle, error) = iface.complete(iface.driver().socket(kind, protocol));
        if handle == INVALID_HANDLE {
            debug!("socket creation failed with error {}", error);
        } else {
            trace!("socket {}: created", handle);
        }

        Self { iface, handle }
    }

    /// Create an invalid socket.
    pub fn invalid(iface: &'i Interface<D>) -> Self {
        Self {
            iface,
            handle: INVALID_HANDLE,
        }
    }

    /// Take ownership of a raw handle.
    ///
    /// The handle will be closed when the returned socket is dropped, so it must not be owned by
    /// any other socket.
    pub fn from_raw(iface: &'i Interface<D>, handle: u8) -> Self {
        Self { iface, handle }
    }

    /// Release ownership of the handle without closing it.
    pub fn into_raw(self) -> u8 {
        let handle = self.handle;
        core::mem::forget(self);

        handle
    }

    /// Move the handle out into a new socket.
    ///
    /// This socket is left invalid.
    pub fn take(&mut self) -> Self {
        Self {
            iface: self.iface,
            handle: core::mem::replace(&mut self.handle, INVALID_HANDLE),
        }
    }

    /// If this socket owns a handle.
    pub fn is_valid(&self) -> bool {
        self.handle != INVALID_HANDLE
    }

    /// The underlying handle.
    ///
    /// This is for debugging purposes only.
    pub fn handle(&self) -> u8 {
        self.handle
    }

    /// The interface this socket belongs to.
    pub fn interface(&self) -> &'i Interface<D> {
        self.iface
    }

    /// The error code of the last completed operation on the interface of this socket.
    ///
    /// Convenience wrapper around [`Interface::last_error`]. Note that the code is shared by all
    /// sockets of the interface.
    pub fn last_error(&self) -> u8 {
        self.iface.last_error()
    }

    /// Close the socket.
    ///
    /// The socket is invalid afterwards. Closing an invalid socket does nothing.
    pub fn close(&mut self) {
        if self.handle == INVALID_HANDLE {
            return;
        }

        let handle = core::mem::replace(&mut self.handle, INVALID_HANDLE);
        let ((), error) = self.iface.complete(self.iface.driver().close(handle));
        if error == 0 {
            trace!("socket {}: closed", handle);
        } else {
            warn!("socket {}: close failed with error {}", handle, error);
        }
    }

    /// Bind the socket to the given local port.
    pub fn bind(&self, port: u16) -> Result<()> {
        let (bound, error) = self
            .iface
            .complete(self.iface.driver().bind(self.handle, port));

        self.check(bound, error)
    }

    /// Start listening for incoming connections.
    pub fn listen(&self, backlog: u8) -> Result<()> {
        let (listening, error) = self
            .iface
            .complete(self.iface.driver().listen(self.handle, backlog));

        self.check(listening, error)
    }

    /// Accept an incoming connection.
    ///
    /// On success, returns the socket of the new connection along with the address of the remote
    /// client.
    pub fn accept(&self) -> Result<(Socket<'i, D>, SocketAddrV4)> {
        let (accepted, error) = self
            .iface
            .complete(self.iface.driver().accept(self.handle));

        match accepted {
            Some(accepted) if accepted.handle != INVALID_HANDLE => {
                trace!(
                    "socket {}: accepted socket {}",
                    self.handle,
                    accepted.handle
                );

                Ok((Socket::from_raw(self.iface, accepted.handle), accepted.remote))
            }
            _ => Err(self.failure(error)),
        }
    }

    /// Connect the socket to a remote endpoint.
    pub fn connect(&self, remote: SocketAddrV4) -> Result<()> {
        let (connected, error) = self
            .iface
            .complete(self.iface.driver().connect(self.handle, remote));

        self.check(connected, error)
    }

    /// Send data to the remote endpoint.
    ///
    /// Returns the number of bytes actually sent, which is never more than `buf.len()`. At most
    /// `u16::MAX` bytes are sent per call. Sending zero bytes while the driver reports an error is
    /// a failure.
    pub fn send(&self, buf: &[u8]) -> Result<usize> {
        let buf = &buf[..buf.len().min(MAX_TRANSFER)];
        let (sent, error) = self
            .iface
            .complete(self.iface.driver().send(self.handle, buf));

        self.transferred(sent, error, buf.len())
    }

    /// Receive data from the remote endpoint.
    ///
    /// Returns the number of bytes actually received, which is never more than `buf.len()`. At
    /// most `u16::MAX` bytes are received per call. Receiving zero bytes while the driver reports
    /// an error is a failure, while zero bytes without an error is the end of the stream.
    pub fn recv(&self, buf: &mut [u8]) -> Result<usize> {
        let len = buf.len().min(MAX_TRANSFER);
        let (received, error) = self
            .iface
            .complete(self.iface.driver().recv(self.handle, &mut buf[..len]));

        self.transferred(received, error, len)
    }

    /// Put the socket into non-blocking or blocking mode.
    ///
    /// This is equivalent to `ioctl(...FIONBIO...)`.
    pub fn set_nonblocking(&self, nonblocking: bool) -> Result<()> {
        let mut arg = u32::from(nonblocking).to_le_bytes();
        let (size, error) = self.iface.complete(self.iface.driver().ioctl(
            self.handle,
            IoControl::NonBlockingIo.code(),
            &mut arg,
        ));

        self.check(size != 0, error)
    }

    /// The number of bytes available for reading.
    ///
    /// This is equivalent to `ioctl(...FIONREAD...)`.
    pub fn available_to_read(&self) -> Result<usize> {
        let mut arg = 0i32.to_le_bytes();
        let (size, error) = self.iface.complete(self.iface.driver().ioctl(
            self.handle,
            IoControl::NRead.code(),
            &mut arg,
        ));
        self.check(size != 0, error)?;

        usize::try_from(i32::from_le_bytes(arg)).map_err(|_| self.failure(error))
    }

    /// The current socket state.
    ///
    /// This is similar in semantics to calling `select()` on the socket.
    pub fn poll(&self) -> Result<State> {
        let (state, error) = self
            .iface
            .complete(self.iface.driver().poll(self.handle));

        state.ok_or_else(|| self.failure(error))
    }

    fn check(&self, success: bool, error: u8) -> Result<()> {
        if success {
            Ok(())
        } else {
            Err(self.failure(error))
        }
    }

    fn transferred(&self, count: u16, error: u8, requested: usize) -> Result<usize> {
        if count == 0 && error != 0 {
            return Err(self.failure(error));
        }

        Ok(usize::from(count).min(requested))
    }

    fn failure(&self, error: u8) -> Error {
        debug!("socket {}: operation failed with error {}", self.handle, error);

        Error::from_failure(error)
    }
}

impl<D> Drop for Socket<'_, D>
where
    D: Driver,
{
    fn drop(&mut self) {
        self.close();
    }
}

impl<D> fmt::Debug for Socket<'_, D>
where
    D: Driver,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Socket")
            .field("handle", &self.handle)
            .finish()
    }
}
