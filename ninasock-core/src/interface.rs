use core::cell::Cell;

use crate::{
    driver::{Completion, Driver},
    socket::{Protocol, Socket, Type},
};

/// A network interface.
///
/// Owns the [`Driver`] and the last-error slot shared by all sockets created from it. Sockets
/// borrow the interface, so it outlives every one of them.
///
/// The interface is not [`Sync`]: driver state addressed by a handle is shared by everything
/// using the interface, and exclusive access is left to the caller.
#[derive(Debug)]
pub struct Interface<D> {
    driver: D,
    last_error: Cell<u8>,
}

impl<D> Interface<D>
where
    D: Driver,
{
    /// Create a new interface over the given driver.
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            last_error: Cell::new(0),
        }
    }

    /// Create a socket.
    ///
    /// Convenience wrapper around [`Socket::new`].
    pub fn socket(&self, kind: Type, protocol: Protocol) -> Socket<'_, D> {
        Socket::new(self, kind, protocol)
    }

    /// The error code of the last completed socket operation on this interface.
    ///
    /// Every socket operation refreshes it, whether it failed or succeeded. It is `0` on success,
    /// an lwIP `errno` value for socket errors or [`crate::errno::SPI_FAILURE`] when the chip
    /// could not be reached. Use [`crate::Error::from_code`] to classify it.
    pub fn last_error(&self) -> u8 {
        self.last_error.get()
    }

    /// The reference to the driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Consume the interface, returning the driver.
    ///
    /// No socket can be alive at this point, since they all borrow the interface.
    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Record the error code of a completed primitive and hand back its value.
    pub(crate) fn complete<T>(&self, completion: Completion<T>) -> (T, u8) {
        self.last_error.set(completion.error);

        (completion.value, completion.error)
    }
}
