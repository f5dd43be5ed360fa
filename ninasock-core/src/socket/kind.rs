/// Socket type.
///
/// Semantics equivalent to `SOCK_STREAM`, `SOCK_DGRAM` etc. of Unix sockets. The values are the
/// lwIP ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Type {
    /// A reliable, connection based byte stream.
    Stream = 1,
    /// Connectionless datagrams.
    DGram = 2,
    /// Raw IP packets.
    Raw = 3,
}

/// Socket protocol.
///
/// Semantics equivalent to `IPPROTO_TCP` etc. of Unix sockets. The values are the lwIP ones. Not
/// all of them are supported by the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Protocol {
    /// Default protocol for the socket type.
    Ip = 0,
    /// ICMP.
    Icmp = 1,
    /// TCP.
    Tcp = 6,
    /// UDP.
    Udp = 17,
    /// IPv6.
    Ipv6 = 41,
    /// ICMP for IPv6.
    Icmpv6 = 58,
    /// UDP-Lite.
    UdpLite = 136,
    /// Raw.
    Raw = 255,
}
