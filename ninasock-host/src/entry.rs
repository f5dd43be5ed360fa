//! The host side of a single socket handle.

use std::{
    collections::VecDeque,
    io::{self, ErrorKind, Read, Write},
    mem::MaybeUninit,
    net::{Ipv4Addr, SocketAddrV4},
};

use ninasock_core::{errno, State, Type};
use socket2::{Domain, Protocol, SockAddr, Socket};

use crate::error::to_errno;

/// Largest datagram looked at when peeking.
const PEEK_SIZE: usize = u16::MAX as usize;

/// A socket in the handle table.
#[derive(Debug)]
pub(crate) struct Entry {
    kind: Type,
    socket: Socket,
    nonblocking: bool,
    role: Role,
    /// Allocated on the first `NREAD` or datagram poll.
    peek_buf: Vec<MaybeUninit<u8>>,
}

#[derive(Debug)]
enum Role {
    Idle,
    Listening {
        pending: VecDeque<(Socket, SocketAddrV4)>,
    },
    Connecting,
    Connected,
}

type Result<T> = std::result::Result<T, u8>;

impl Entry {
    pub(crate) fn new(kind: Type) -> Result<Self> {
        let (ty, protocol) = match kind {
            Type::Stream => (socket2::Type::STREAM, Protocol::TCP),
            Type::DGram => (socket2::Type::DGRAM, Protocol::UDP),
            Type::Raw => return Err(errno::EPROTONOSUPPORT),
        };
        let socket = Socket::new(Domain::IPV4, ty, Some(protocol)).map_err(io_errno)?;

        Ok(Self::with_socket(kind, socket, Role::Idle))
    }

    pub(crate) fn accepted(socket: Socket) -> Result<Self> {
        // Some platforms let the listener's mode leak into accepted sockets.
        socket.set_nonblocking(false).map_err(io_errno)?;

        Ok(Self::with_socket(Type::Stream, socket, Role::Connected))
    }

    fn with_socket(kind: Type, socket: Socket, role: Role) -> Self {
        Self {
            kind,
            socket,
            nonblocking: false,
            role,
            peek_buf: Vec::new(),
        }
    }

    pub(crate) fn bind(&mut self, port: u16) -> Result<()> {
        let local = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port);

        self.socket.bind(&SockAddr::from(local)).map_err(io_errno)
    }

    pub(crate) fn listen(&mut self, backlog: u8) -> Result<()> {
        if self.kind != Type::Stream {
            return Err(errno::EOPNOTSUPP);
        }
        if let Role::Listening { .. } = self.role {
            return Ok(());
        }

        self.socket
            .listen(i32::from(backlog))
            .map_err(io_errno)?;
        self.role = Role::Listening {
            pending: VecDeque::new(),
        };

        Ok(())
    }

    pub(crate) fn accept(&mut self) -> Result<(Socket, SocketAddrV4)> {
        let Role::Listening { pending } = &mut self.role else {
            return Err(errno::EINVAL);
        };
        if let Some(accepted) = pending.pop_front() {
            return Ok(accepted);
        }

        let (socket, remote) = self.socket.accept().map_err(io_errno)?;
        let remote = remote.as_socket_ipv4().ok_or(errno::EAFNOSUPPORT)?;

        Ok((socket, remote))
    }

    pub(crate) fn connect(&mut self, remote: SocketAddrV4) -> Result<()> {
        if let Err(e) = self.socket.connect(&SockAddr::from(remote)) {
            let error = to_errno(&e);
            if error == errno::EINPROGRESS || error == errno::EWOULDBLOCK {
                self.role = Role::Connecting;
            }

            return Err(error);
        }
        self.role = Role::Connected;

        Ok(())
    }

    pub(crate) fn send(&mut self, buf: &[u8]) -> Result<usize> {
        self.established()?;

        self.socket.write(buf).map_err(io_errno)
    }

    pub(crate) fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        // A bound datagram socket receives from anyone.
        if self.kind == Type::Stream {
            self.established()?;
        }

        self.socket.read(buf).map_err(io_errno)
    }

    pub(crate) fn set_nonblocking(&mut self, nonblocking: bool) -> Result<()> {
        self.socket.set_nonblocking(nonblocking).map_err(io_errno)?;
        self.nonblocking = nonblocking;

        Ok(())
    }

    pub(crate) fn available(&mut self) -> Result<usize> {
        if self.kind == Type::Stream && !matches!(self.role, Role::Connected) {
            return Ok(0);
        }
        if self.peek_buf.is_empty() {
            self.peek_buf.resize(PEEK_SIZE, MaybeUninit::uninit());
        }
        let available = peek(&self.socket, &mut self.peek_buf, self.nonblocking);

        Ok(available.map_err(io_errno)?.unwrap_or(0))
    }

    pub(crate) fn poll(&mut self) -> Result<State> {
        if let Role::Connecting = self.role {
            match self.established() {
                Ok(()) => (),
                Err(errno::EWOULDBLOCK) => return Ok(State::empty()),
                Err(_) => return Ok(State::ERRORED_OUT),
            }
        }

        let nonblocking = self.nonblocking;
        let mut state = match &mut self.role {
            Role::Listening { pending } => {
                if pending.is_empty() {
                    let accepted = try_accept(&self.socket, nonblocking).map_err(io_errno)?;
                    pending.extend(accepted);
                }
                if pending.is_empty() {
                    State::empty()
                } else {
                    State::READABLE
                }
            }
            Role::Idle if self.kind == Type::Stream => State::empty(),
            _ if self.kind == Type::Stream => {
                let mut state = State::WRITABLE;
                let mut byte = [MaybeUninit::uninit(); 1];
                match peek(&self.socket, &mut byte, nonblocking) {
                    // End of stream counts as readable.
                    Ok(Some(_)) => state |= State::READABLE,
                    Ok(None) => (),
                    Err(_) => state |= State::READABLE | State::ERRORED_OUT,
                }

                state
            }
            _ => {
                if self.peek_buf.is_empty() {
                    self.peek_buf.resize(PEEK_SIZE, MaybeUninit::uninit());
                }
                let mut state = State::WRITABLE;
                match peek(&self.socket, &mut self.peek_buf, nonblocking) {
                    Ok(Some(_)) => state |= State::READABLE,
                    Ok(None) => (),
                    Err(_) => state |= State::ERRORED_OUT,
                }

                state
            }
        };
        if let Ok(Some(_)) = self.socket.take_error() {
            state |= State::ERRORED_OUT;
        }

        Ok(state)
    }

    /// Check the socket is connected, completing a pending non-blocking connect.
    fn established(&mut self) -> Result<()> {
        match self.role {
            Role::Connected => Ok(()),
            Role::Connecting => {
                if let Some(e) = self.socket.take_error().map_err(io_errno)? {
                    self.role = Role::Idle;
                    return Err(to_errno(&e));
                }
                if self.socket.peer_addr().is_err() {
                    return Err(errno::EWOULDBLOCK);
                }
                self.role = Role::Connected;

                Ok(())
            }
            Role::Idle | Role::Listening { .. } => Err(errno::ENOTCONN),
        }
    }
}

/// Peek without blocking, restoring the configured mode afterwards.
///
/// Returns `None` if nothing is pending.
fn peek(
    socket: &Socket,
    buf: &mut [MaybeUninit<u8>],
    nonblocking: bool,
) -> io::Result<Option<usize>> {
    socket.set_nonblocking(true)?;
    let res = socket.peek(buf);
    socket.set_nonblocking(nonblocking)?;

    match res {
        Ok(n) => Ok(Some(n)),
        Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
        Err(e) => Err(e),
    }
}

fn try_accept(socket: &Socket, nonblocking: bool) -> io::Result<Option<(Socket, SocketAddrV4)>> {
    socket.set_nonblocking(true)?;
    let res = socket.accept();
    socket.set_nonblocking(nonblocking)?;

    match res {
        // The listener is bound to an IPv4 address.
        Ok((socket, remote)) => Ok(remote.as_socket_ipv4().map(|remote| (socket, remote))),
        Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
        Err(e) => Err(e),
    }
}

fn io_errno(e: io::Error) -> u8 {
    to_errno(&e)
}
