mod socket;
pub(crate) use socket::RawSocket;
pub(crate) use socket::Socket;
#[cfg(test)]
pub(crate) use socket::tests;

mod v4;
pub use v4::IcmpV4;

mod v6;
pub use v6::IcmpV6;

use std::net::{IpAddr, SocketAddr};

/// What a received ICMP message turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    EchoReply,
    /// Any non-echo-reply message, by raw type number. Error classes
    /// (destination unreachable, time exceeded, ...) are not told apart.
    Other(u8),
}

/// Address-family details of the echo exchange.
///
/// The probe engine is generic over this trait; `IcmpV4` and `IcmpV6` are
/// the two implementations.
pub trait IcmpFamily {
    fn domain() -> socket2::Domain;
    fn protocol() -> socket2::Protocol;
    /// Wildcard address the raw listener binds to.
    fn wildcard() -> IpAddr;
    /// Well-known public endpoint used only to let the OS pick the
    /// outbound source address.
    fn discovery_addr() -> SocketAddr;
    fn matches(ip: IpAddr) -> bool;
    /// Serializes one echo request with code 0 and an empty payload.
    /// `None` when the packet buffer cannot be constructed.
    fn encode_echo_request(identifier: u16, sequence: u16) -> Option<Vec<u8>>;
    /// Parses a received datagram (IP header already stripped) as an ICMP
    /// message of this family. `None` when the bytes do not parse.
    fn classify_reply(datagram: &[u8]) -> Option<Reply>;
}
