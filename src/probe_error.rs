use std::net::IpAddr;
use std::{error::Error, fmt, io};

/// Everything that can go wrong during one probe cycle.
///
/// Every failure is returned to the caller; no path aborts the process.
#[derive(Debug)]
pub enum ProbeError {
    /// The outbound local address could not be determined.
    LocalAddrDiscovery(io::Error),
    /// The raw ICMP listener could not be opened or configured.
    ListenSetup(io::Error),
    /// The destination string did not resolve to an address of the
    /// engine's family.
    Resolve {
        host: String,
        source: Option<io::Error>,
    },
    /// The echo request could not be serialized.
    EncodeRequest,
    /// Writing the echo request failed.
    Transmit { peer: IpAddr, source: io::Error },
    /// Fewer bytes than the serialized request went out on the wire.
    ShortWrite {
        peer: IpAddr,
        written: usize,
        expected: usize,
    },
    /// Reading the reply failed, including deadline expiry.
    Receive {
        peer: IpAddr,
        loss_percent: f64,
        source: io::Error,
    },
    /// The received bytes did not parse as an ICMP message.
    DecodeReply { peer: IpAddr },
    /// A well-formed ICMP message arrived, but not an echo reply.
    UnexpectedReply {
        sender: IpAddr,
        icmp_type: u8,
        loss_percent: f64,
    },
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            ProbeError::LocalAddrDiscovery(e) => {
                write!(f, "could not discover outbound local address: {e}")
            }
            ProbeError::ListenSetup(e) => write!(f, "could not open raw ICMP listener: {e}"),
            ProbeError::Resolve { host, source } => {
                write!(f, "could not resolve host {host}")?;
                if let Some(e) = source {
                    write!(f, ": {e}")?;
                }
                Ok(())
            }
            ProbeError::EncodeRequest => write!(f, "could not encode echo request"),
            ProbeError::Transmit { peer, source } => {
                write!(f, "could not send echo request to {peer}: {source}")
            }
            ProbeError::ShortWrite {
                peer,
                written,
                expected,
            } => write!(f, "short write to {peer}: got {written}; want {expected}"),
            ProbeError::Receive { peer, source, .. } => {
                write!(f, "no reply from {peer}: {source}")
            }
            ProbeError::DecodeReply { peer } => write!(f, "could not decode reply from {peer}"),
            ProbeError::UnexpectedReply {
                sender, icmp_type, ..
            } => write!(f, "got ICMP type {icmp_type} from {sender}; want echo reply"),
        }
    }
}

impl Error for ProbeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ProbeError::LocalAddrDiscovery(e)
            | ProbeError::ListenSetup(e)
            | ProbeError::Transmit { source: e, .. }
            | ProbeError::Receive { source: e, .. } => Some(e),
            ProbeError::Resolve {
                source: Some(e), ..
            } => Some(e),
            _ => None,
        }
    }
}
