use std::marker::PhantomData;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use crate::counters::Counters;
use crate::icmp::{IcmpFamily, RawSocket, Reply, Socket};
use crate::local_addr;
use crate::probe_error::ProbeError;
use crate::probe_report::ProbeReport;
use crate::resolve;

/// Read deadline for one echo reply.
const RECV_TIMEOUT: Duration = Duration::from_secs(10);
const REPLY_BUFFER_SIZE: usize = 1500;
// Probes run strictly one at a time; no cross-probe correlation happens,
// so the sequence number stays constant.
const ECHO_SEQUENCE: u16 = 1;

/// Runs one full echo exchange per call: local-address discovery, raw
/// listener setup, destination resolution, request transmission, reply
/// reception under a deadline, and loss/RTT accounting.
///
/// The engine keeps no state between calls except the send/receive
/// counter pair. Both sockets live and die inside `probe`.
pub struct ProbeEngine<F> {
    counters: Counters,
    identifier: u16,
    family: PhantomData<F>,
}

impl<F: IcmpFamily> ProbeEngine<F> {
    pub fn new() -> Self {
        ProbeEngine {
            counters: Counters::default(),
            // Low 16 bits of the pid, stable for the process lifetime.
            identifier: std::process::id() as u16,
            family: PhantomData,
        }
    }

    pub fn packets_sent(&self) -> u64 {
        self.counters.sent()
    }

    pub fn packets_received(&self) -> u64 {
        self.counters.received()
    }

    pub fn loss_percent(&self) -> f64 {
        self.counters.loss_percent()
    }

    pub fn probe(&mut self, destination: &str) -> Result<ProbeReport, ProbeError> {
        // (1) Let the OS pick the outbound source address.
        let local_addr =
            local_addr::discover(F::discovery_addr()).map_err(ProbeError::LocalAddrDiscovery)?;

        // (2) Open the raw listener for the reply.
        let socket = RawSocket::open(F::domain(), F::protocol(), F::wildcard(), RECV_TIMEOUT)
            .map_err(ProbeError::ListenSetup)?;

        // (3) Resolve the destination fresh for this cycle.
        let peer_addr = resolve::lookup_host::<F>(destination)?;

        self.exchange(&socket, local_addr, peer_addr)
    }

    fn exchange<S: Socket>(
        &mut self,
        socket: &S,
        local_addr: IpAddr,
        peer_addr: IpAddr,
    ) -> Result<ProbeReport, ProbeError> {
        // (4) Build and serialize the echo request.
        let request =
            F::encode_echo_request(self.identifier, ECHO_SEQUENCE).ok_or(ProbeError::EncodeRequest)?;

        // (5) Transmit. The sent counter moves on every attempt, success
        // or not.
        let addr: socket2::SockAddr = SocketAddr::new(peer_addr, 0).into();
        let start_time = Instant::now();
        let write_result = socket.send_to(&request, &addr);
        self.counters.record_sent();
        let written = write_result.map_err(|source| ProbeError::Transmit {
            peer: peer_addr,
            source,
        })?;
        if written != request.len() {
            return Err(ProbeError::ShortWrite {
                peer: peer_addr,
                written,
                expected: request.len(),
            });
        }
        tracing::trace!("echo request sent");

        // (6) Wait for the reply under the read deadline.
        let mut reply = [0u8; REPLY_BUFFER_SIZE];
        let (n, sender) =
            socket
                .recv_from(&mut reply)
                .map_err(|source| ProbeError::Receive {
                    peer: peer_addr,
                    loss_percent: self.counters.loss_percent(),
                    source,
                })?;
        // (7) RTT stops at the moment of receipt, not of parsing.
        let rtt = start_time.elapsed();

        // (8) Only a structurally valid ICMP message counts as received;
        // the loss ratio is recomputed right after the counter moves.
        match F::classify_reply(&reply[..n]) {
            None => Err(ProbeError::DecodeReply { peer: peer_addr }),
            Some(reply_kind) => {
                self.counters.record_received();
                let loss_percent = self.counters.loss_percent();
                // (9) Anything other than an echo reply is reported
                // uniformly, whatever the message class.
                match reply_kind {
                    Reply::EchoReply => {
                        tracing::trace!("echo reply received");
                        Ok(ProbeReport {
                            local_addr,
                            peer_addr,
                            rtt,
                            loss_percent,
                        })
                    }
                    Reply::Other(icmp_type) => Err(ProbeError::UnexpectedReply {
                        sender,
                        icmp_type,
                        loss_percent,
                    }),
                }
            }
        }
    }
}

impl<F: IcmpFamily> Default for ProbeEngine<F> {
    fn default() -> Self {
        Self::new()
    }
}
