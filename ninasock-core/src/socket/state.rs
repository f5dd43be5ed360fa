bitflags::bitflags! {
    /// Socket state bitmask, as reported by [`super::Socket::poll`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct State: u8 {
        /// Data (or an incoming connection, or end of stream) is available to read.
        const READABLE = 0x01;
        /// The socket can accept more data to send.
        const WRITABLE = 0x02;
        /// The socket has a pending error.
        const ERRORED_OUT = 0x04;
    }
}

/// I/O control requests understood by the firmware.
///
/// The values are lwIP's and must be preserved bit-exact. The argument of either request is a
/// 4-byte little-endian integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum IoControl {
    /// Number of bytes available for reading (`FIONREAD`).
    NRead = 0x4004_667F,
    /// Toggle non-blocking mode (`FIONBIO`).
    NonBlockingIo = 0x8004_667E,
}

impl IoControl {
    /// The numeric request code.
    pub fn code(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for IoControl {
    type Error = crate::Error;

    fn try_from(code: u32) -> crate::Result<Self> {
        match code {
            0x4004_667F => Ok(IoControl::NRead),
            0x8004_667E => Ok(IoControl::NonBlockingIo),
            _ => Err(crate::Error::Stack(crate::errno::EINVAL)),
        }
    }
}
