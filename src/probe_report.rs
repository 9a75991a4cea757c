use std::net::IpAddr;
use std::time::Duration;

/// Outcome of one successful probe cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeReport {
    /// Source address the OS picked for the current default route.
    pub local_addr: IpAddr,
    /// Address the destination string resolved to for this cycle.
    pub peer_addr: IpAddr,
    /// Elapsed time between sending the request and receiving the reply.
    pub rtt: Duration,
    /// Running loss ratio over the engine's lifetime, in percent.
    pub loss_percent: f64,
}
