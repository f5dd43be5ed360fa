use std::io::{self, ErrorKind};

use ninasock_core::errno;

/// Translate a host I/O error into the lwIP `errno` the firmware would have reported.
pub(crate) fn to_errno(e: &io::Error) -> u8 {
    #[cfg(unix)]
    {
        if let Some(code) = e.raw_os_error().and_then(from_os_code) {
            return code;
        }
    }

    match e.kind() {
        ErrorKind::WouldBlock => errno::EWOULDBLOCK,
        ErrorKind::ConnectionRefused => errno::ECONNREFUSED,
        ErrorKind::ConnectionReset => errno::ECONNRESET,
        ErrorKind::ConnectionAborted => errno::ECONNABORTED,
        ErrorKind::NotConnected => errno::ENOTCONN,
        ErrorKind::AddrInUse => errno::EADDRINUSE,
        ErrorKind::AddrNotAvailable => errno::EADDRNOTAVAIL,
        ErrorKind::BrokenPipe => errno::EPIPE,
        ErrorKind::TimedOut => errno::ETIMEDOUT,
        ErrorKind::InvalidInput => errno::EINVAL,
        ErrorKind::OutOfMemory => errno::ENOMEM,
        ErrorKind::Unsupported => errno::EOPNOTSUPP,
        ErrorKind::HostUnreachable => errno::EHOSTUNREACH,
        ErrorKind::NetworkUnreachable => errno::ENETUNREACH,
        _ => errno::EIO,
    }
}

/// Codes `io::ErrorKind` has no stable variant for.
#[cfg(unix)]
fn from_os_code(code: i32) -> Option<u8> {
    let errno = match code {
        libc::EINPROGRESS => errno::EINPROGRESS,
        libc::EALREADY => errno::EALREADY,
        libc::EISCONN => errno::EISCONN,
        libc::EBADF => errno::EBADF,
        libc::EINVAL => errno::EINVAL,
        libc::EAFNOSUPPORT => errno::EAFNOSUPPORT,
        libc::EPROTONOSUPPORT => errno::EPROTONOSUPPORT,
        libc::ENFILE | libc::EMFILE => errno::ENFILE,
        libc::ENOBUFS => errno::ENOMEM,
        _ => return None,
    };

    Some(errno)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_map_to_lwip_codes() {
        let refused = io::Error::from(ErrorKind::ConnectionRefused);
        assert_eq!(to_errno(&refused), errno::ECONNREFUSED);
        let would_block = io::Error::from(ErrorKind::WouldBlock);
        assert_eq!(to_errno(&would_block), errno::EWOULDBLOCK);
        let other = io::Error::other("boom");
        assert_eq!(to_errno(&other), errno::EIO);
    }

    #[cfg(unix)]
    #[test]
    fn os_codes_map_to_lwip_codes() {
        let in_progress = io::Error::from_raw_os_error(libc::EINPROGRESS);
        assert_eq!(to_errno(&in_progress), errno::EINPROGRESS);
        let connected = io::Error::from_raw_os_error(libc::EISCONN);
        assert_eq!(to_errno(&connected), errno::EISCONN);
        let in_use = io::Error::from_raw_os_error(libc::EADDRINUSE);
        assert_eq!(to_errno(&in_use), errno::EADDRINUSE);
        let too_many = io::Error::from_raw_os_error(libc::EMFILE);
        assert_eq!(to_errno(&too_many), errno::ENFILE);
    }
}
