/// The Error type for the ninasock crates.
///
/// Every error corresponds to a last-error code (see [`crate::Interface::last_error`]). Socket
/// stack errors and driver communication errors come from disjoint code ranges, so the variant
/// alone tells whether the chip was reached at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Error {
    /// An error reported by the socket stack on the chip, as an lwIP `errno` value.
    ///
    /// Never `0` and never [`errno::SPI_FAILURE`].
    Stack(u8),
    /// Communication with the chip failed.
    SpiFailure,
    /// The driver reported a failure but left the error code at `0`.
    Unspecified,
}

/// The Result type for the ninasock crates.
pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    /// Classify a last-error code.
    ///
    /// Returns `None` for `0`, which means success.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => None,
            errno::SPI_FAILURE => Some(Error::SpiFailure),
            code => Some(Error::Stack(code)),
        }
    }

    /// The error for an operation that failed with the given last-error code.
    pub(crate) fn from_failure(code: u8) -> Self {
        Self::from_code(code).unwrap_or(Error::Unspecified)
    }

    /// The numeric last-error code of this error.
    ///
    /// [`Error::Unspecified`] maps to `0`.
    pub fn code(&self) -> u8 {
        match self {
            Error::Stack(code) => *code,
            Error::SpiFailure => errno::SPI_FAILURE,
            Error::Unspecified => 0,
        }
    }

    /// Whether the chip could not be reached, as opposed to the socket stack rejecting the call.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::SpiFailure)
    }

    /// Whether the stack reported that a non-blocking call would have blocked.
    pub fn is_would_block(&self) -> bool {
        matches!(self, Error::Stack(errno::EWOULDBLOCK) | Error::Stack(errno::EINPROGRESS))
    }
}

impl core::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Stack(code) => match errno::name(*code) {
                Some(name) => write!(f, "Socket error {name} ({code})"),
                None => write!(f, "Socket error {code}"),
            },
            Error::SpiFailure => write!(f, "Failed to communicate with the WiFi chip"),
            Error::Unspecified => write!(f, "Unspecified driver failure"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, fmt: defmt::Formatter<'_>) {
        match self {
            Error::Stack(code) => defmt::write!(fmt, "Socket error {}", code),
            Error::SpiFailure => defmt::write!(fmt, "Failed to communicate with the WiFi chip"),
            Error::Unspecified => defmt::write!(fmt, "Unspecified driver failure"),
        }
    }
}

/// Last-error codes.
///
/// The stack codes are the lwIP `errno` values used by the NINA firmware. [`SPI_FAILURE`] is the
/// driver's own code and lies outside the `errno` range.
pub mod errno {
    /// I/O error.
    pub const EIO: u8 = 5;
    /// Bad socket handle.
    pub const EBADF: u8 = 9;
    /// Operation would block.
    pub const EWOULDBLOCK: u8 = 11;
    /// Out of memory.
    pub const ENOMEM: u8 = 12;
    /// Invalid argument.
    pub const EINVAL: u8 = 22;
    /// Socket table is full.
    pub const ENFILE: u8 = 23;
    /// Broken pipe.
    pub const EPIPE: u8 = 32;
    /// Protocol not supported.
    pub const EPROTONOSUPPORT: u8 = 93;
    /// Operation not supported on this socket.
    pub const EOPNOTSUPP: u8 = 95;
    /// Address family not supported.
    pub const EAFNOSUPPORT: u8 = 97;
    /// Address already in use.
    pub const EADDRINUSE: u8 = 98;
    /// Address not available.
    pub const EADDRNOTAVAIL: u8 = 99;
    /// Network is unreachable.
    pub const ENETUNREACH: u8 = 101;
    /// Connection aborted.
    pub const ECONNABORTED: u8 = 103;
    /// Connection reset by peer.
    pub const ECONNRESET: u8 = 104;
    /// Socket is already connected.
    pub const EISCONN: u8 = 106;
    /// Socket is not connected.
    pub const ENOTCONN: u8 = 107;
    /// Timed out.
    pub const ETIMEDOUT: u8 = 110;
    /// Connection refused.
    pub const ECONNREFUSED: u8 = 111;
    /// Host is unreachable.
    pub const EHOSTUNREACH: u8 = 113;
    /// Operation already in progress.
    pub const EALREADY: u8 = 114;
    /// Operation now in progress.
    pub const EINPROGRESS: u8 = 115;

    /// The chip could not be reached over SPI.
    pub const SPI_FAILURE: u8 = 255;

    /// The symbolic name of a known code.
    pub fn name(code: u8) -> Option<&'static str> {
        let name = match code {
            EIO => "EIO",
            EBADF => "EBADF",
            EWOULDBLOCK => "EWOULDBLOCK",
            ENOMEM => "ENOMEM",
            EINVAL => "EINVAL",
            ENFILE => "ENFILE",
            EPIPE => "EPIPE",
            EPROTONOSUPPORT => "EPROTONOSUPPORT",
            EOPNOTSUPP => "EOPNOTSUPP",
            EAFNOSUPPORT => "EAFNOSUPPORT",
            EADDRINUSE => "EADDRINUSE",
            EADDRNOTAVAIL => "EADDRNOTAVAIL",
            ENETUNREACH => "ENETUNREACH",
            ECONNABORTED => "ECONNABORTED",
            ECONNRESET => "ECONNRESET",
            EISCONN => "EISCONN",
            ENOTCONN => "ENOTCONN",
            ETIMEDOUT => "ETIMEDOUT",
            ECONNREFUSED => "ECONNREFUSED",
            EHOSTUNREACH => "EHOSTUNREACH",
            EALREADY => "EALREADY",
            EINPROGRESS => "EINPROGRESS",
            SPI_FAILURE => "SPI_FAILURE",
            _ => return None,
        };

        Some(name)
    }
}
