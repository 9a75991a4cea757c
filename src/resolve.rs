use std::net::IpAddr;

use crate::icmp::IcmpFamily;
use crate::probe_error::ProbeError;

/// Resolves a hostname or literal address to the first address of the
/// family `F`. Resolution runs fresh on every call; nothing is cached.
pub(crate) fn lookup_host<F: IcmpFamily>(host: &str) -> Result<IpAddr, ProbeError> {
    let ips: Vec<IpAddr> = dns_lookup::lookup_host(host).map_err(|e| ProbeError::Resolve {
        host: host.to_owned(),
        source: Some(e),
    })?;
    ips.into_iter()
        .find(|ip| F::matches(*ip))
        .ok_or_else(|| ProbeError::Resolve {
            host: host.to_owned(),
            source: None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icmp::{IcmpV4, IcmpV6};
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn literal_ipv4_resolves_to_itself() {
        let ip = lookup_host::<IcmpV4>("127.0.0.1").unwrap();
        assert_eq!(IpAddr::V4(Ipv4Addr::LOCALHOST), ip);
    }

    #[test]
    fn literal_ipv6_resolves_to_itself() {
        let ip = lookup_host::<IcmpV6>("::1").unwrap();
        assert_eq!(IpAddr::V6(Ipv6Addr::LOCALHOST), ip);
    }

    #[test]
    fn wrong_family_literal_is_a_resolve_error() {
        let result = lookup_host::<IcmpV4>("::1");
        assert!(matches!(result, Err(ProbeError::Resolve { .. })));
    }

    #[test]
    fn malformed_host_is_a_resolve_error_not_an_abort() {
        let result = lookup_host::<IcmpV4>("");
        assert!(matches!(result, Err(ProbeError::Resolve { .. })));
    }
}
