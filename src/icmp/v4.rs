use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use pnet_packet::icmp::echo_request::MutableEchoRequestPacket;
use pnet_packet::icmp::{checksum, IcmpCode, IcmpPacket, IcmpTypes};
use pnet_packet::Packet;

use super::{IcmpFamily, Reply};

/// ICMPv4 echo details: type 8 request, type 0 reply, protocol number 1.
pub struct IcmpV4;

impl IcmpFamily for IcmpV4 {
    fn domain() -> socket2::Domain {
        socket2::Domain::IPV4
    }

    fn protocol() -> socket2::Protocol {
        socket2::Protocol::ICMPV4
    }

    fn wildcard() -> IpAddr {
        IpAddr::V4(Ipv4Addr::UNSPECIFIED)
    }

    fn discovery_addr() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), 80)
    }

    fn matches(ip: IpAddr) -> bool {
        matches!(ip, IpAddr::V4(_))
    }

    fn encode_echo_request(identifier: u16, sequence: u16) -> Option<Vec<u8>> {
        let buf = vec![0u8; MutableEchoRequestPacket::minimum_packet_size()];
        let mut package = MutableEchoRequestPacket::owned(buf)?;
        package.set_icmp_type(IcmpTypes::EchoRequest);
        package.set_icmp_code(IcmpCode::new(0));
        package.set_identifier(identifier);
        package.set_sequence_number(sequence);

        package.set_checksum(0_u16);
        let checksum = checksum(&IcmpPacket::new(package.packet())?);
        package.set_checksum(checksum);
        Some(package.packet().to_vec())
    }

    fn classify_reply(datagram: &[u8]) -> Option<Reply> {
        let package = IcmpPacket::new(datagram)?;
        if package.get_icmp_type() == IcmpTypes::EchoReply {
            Some(Reply::EchoReply)
        } else {
            Some(Reply::Other(package.get_icmp_type().0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_produces_a_well_formed_request() {
        let identifier = std::process::id() as u16;
        let bytes = IcmpV4::encode_echo_request(identifier, 1).unwrap();

        assert_eq!(8, bytes.len());
        assert_eq!(8, bytes[0]); // echo request
        assert_eq!(0, bytes[1]); // code
        assert_eq!(identifier, u16::from_be_bytes([bytes[4], bytes[5]]));
        assert_eq!(1, u16::from_be_bytes([bytes[6], bytes[7]]));
        assert_ne!(0, u16::from_be_bytes([bytes[2], bytes[3]]));
    }

    #[test]
    fn a_type_flipped_request_classifies_as_echo_reply() {
        let mut bytes = IcmpV4::encode_echo_request(std::process::id() as u16, 1).unwrap();
        bytes[0] = 0; // echo reply
        assert_eq!(Some(Reply::EchoReply), IcmpV4::classify_reply(&bytes));
    }

    #[test]
    fn destination_unreachable_classifies_as_other() {
        let mut bytes = vec![0u8; 8];
        bytes[0] = 3;
        assert_eq!(Some(Reply::Other(3)), IcmpV4::classify_reply(&bytes));
    }

    #[test]
    fn truncated_bytes_do_not_classify() {
        assert_eq!(None, IcmpV4::classify_reply(&[0u8; 3]));
    }
}
