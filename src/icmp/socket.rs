use std::net::{IpAddr, SocketAddr};
use std::{io, time::Duration};

use pnet_packet::ipv4::Ipv4Packet;
use pnet_packet::Packet;
use socket2::{Domain, Protocol, Type};

/// Transport seam of the probe engine. `RawSocket` is the production
/// implementation; tests substitute `SocketMock`.
///
/// `recv_from` yields ICMP message bytes with any IP framing already
/// removed.
pub(crate) trait Socket: Send + Sync {
    fn send_to(&self, buf: &[u8], addr: &socket2::SockAddr) -> io::Result<usize>;
    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, IpAddr)>;
}

pub(crate) struct RawSocket {
    socket: socket2::Socket,
    // IPv4 raw sockets deliver the IP header with every datagram; IPv6 raw
    // sockets deliver the bare ICMPv6 message.
    trim_ip_header: bool,
}

impl RawSocket {
    pub(crate) fn open(
        domain: Domain,
        protocol: Protocol,
        wildcard: IpAddr,
        read_timeout: Duration,
    ) -> io::Result<RawSocket> {
        let socket = socket2::Socket::new(domain, Type::RAW, Some(protocol))?;
        socket.bind(&SocketAddr::new(wildcard, 0).into())?;
        socket.set_read_timeout(Some(read_timeout))?;
        Ok(RawSocket {
            socket,
            trim_ip_header: domain == Domain::IPV4,
        })
    }
}

impl Socket for RawSocket {
    fn send_to(&self, buf: &[u8], addr: &socket2::SockAddr) -> io::Result<usize> {
        self.socket.send_to(buf, addr)
    }

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, IpAddr)> {
        let mut recv_buf = [0u8; 1500];

        // Socket2 guarantees it never reads from the buffer, which makes the
        // cast from `&mut [u8]` to `&mut [MaybeUninit<u8>]` sound:
        // https://docs.rs/socket2/0.4.7/socket2/struct.Socket.html#method.recv
        let (n, socket_addr) = socket2::Socket::recv_from(&self.socket, unsafe {
            &mut *(std::ptr::addr_of_mut!(recv_buf) as *mut [u8]
                as *mut [std::mem::MaybeUninit<u8>])
        })?;
        let sender = socket_addr
            .as_socket()
            .map(|addr| addr.ip())
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "sender is not an IP address"))?;

        let datagram = &recv_buf[..n];
        let ip_packet = if self.trim_ip_header {
            Ipv4Packet::new(datagram)
        } else {
            None
        };
        // An undecodable IP header falls through to the reply parser.
        let icmp_bytes = match &ip_packet {
            Some(packet) if !packet.payload().is_empty() => packet.payload(),
            _ => datagram,
        };

        let len = icmp_bytes.len().min(buf.len());
        buf[..len].copy_from_slice(&icmp_bytes[..len]);
        Ok((len, sender))
    }
}
