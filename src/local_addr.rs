use std::io;
use std::net::{IpAddr, SocketAddr};

use socket2::{Domain, Protocol, Socket, Type};

/// Asks the OS which source address it would use for the current default
/// route by connecting a UDP socket toward `discovery_addr`.
///
/// Connecting a UDP socket selects a route without sending any packet. The
/// socket is closed on drop; nothing outlives the call.
pub(crate) fn discover(discovery_addr: SocketAddr) -> io::Result<IpAddr> {
    let domain = match discovery_addr {
        SocketAddr::V4(_) => Domain::IPV4,
        SocketAddr::V6(_) => Domain::IPV6,
    };
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    socket.connect(&discovery_addr.into())?;
    let local = socket.local_addr()?;
    local
        .as_socket()
        .map(|addr| addr.ip())
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "local endpoint is not an IP address"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn discover_toward_loopback_yields_loopback() {
        // Loopback is always routable, even on machines with no uplink.
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 80);
        let local = discover(addr).unwrap();
        assert_eq!(IpAddr::V4(Ipv4Addr::LOCALHOST), local);
    }
}
