use std::net::{IpAddr, Ipv6Addr, SocketAddr};

use pnet_packet::icmpv6::echo_request::{Icmpv6Codes, MutableEchoRequestPacket};
use pnet_packet::icmpv6::{Icmpv6Packet, Icmpv6Types};
use pnet_packet::Packet;

use super::{IcmpFamily, Reply};

/// ICMPv6 echo details: type 128 request, type 129 reply, protocol
/// number 58.
pub struct IcmpV6;

impl IcmpFamily for IcmpV6 {
    fn domain() -> socket2::Domain {
        socket2::Domain::IPV6
    }

    fn protocol() -> socket2::Protocol {
        socket2::Protocol::ICMPV6
    }

    fn wildcard() -> IpAddr {
        IpAddr::V6(Ipv6Addr::UNSPECIFIED)
    }

    fn discovery_addr() -> SocketAddr {
        SocketAddr::new(
            IpAddr::V6(Ipv6Addr::new(0x2001, 0x4860, 0x4860, 0, 0, 0, 0, 0x8888)),
            80,
        )
    }

    fn matches(ip: IpAddr) -> bool {
        matches!(ip, IpAddr::V6(_))
    }

    fn encode_echo_request(identifier: u16, sequence: u16) -> Option<Vec<u8>> {
        let buf = vec![0u8; MutableEchoRequestPacket::minimum_packet_size()];
        let mut package = MutableEchoRequestPacket::owned(buf)?;
        package.set_icmpv6_type(Icmpv6Types::EchoRequest);
        package.set_icmpv6_code(Icmpv6Codes::NoCode);
        package.set_identifier(identifier);
        package.set_sequence_number(sequence);

        // The kernel rewrites the checksum with the IPv6 pseudo-header on
        // raw ICMPv6 sockets; this one covers the message bytes only.
        package.set_checksum(0_u16);
        let checksum = pnet_packet::util::checksum(package.packet(), 1);
        package.set_checksum(checksum);
        Some(package.packet().to_vec())
    }

    fn classify_reply(datagram: &[u8]) -> Option<Reply> {
        let package = Icmpv6Packet::new(datagram)?;
        if package.get_icmpv6_type() == Icmpv6Types::EchoReply {
            Some(Reply::EchoReply)
        } else {
            Some(Reply::Other(package.get_icmpv6_type().0))
        }
    }
}
