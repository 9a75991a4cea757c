use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::icmp::IcmpFamily;
use crate::probe_engine::ProbeEngine;
use crate::probe_error::ProbeError;
use crate::probe_report::ProbeReport;

/// What one probe cycle produced.
pub type ProbeOutcome = Result<ProbeReport, ProbeError>;

pub struct RunnerConfig {
    /// Destination string, fixed for the lifetime of the runner.
    pub destination: String,
    /// Delay between the end of one cycle and the start of the next.
    pub interval: Duration,
    /// Capacity of the outcome channel.
    pub channel_size: usize,
}

impl RunnerConfig {
    pub fn new(destination: impl Into<String>) -> RunnerConfig {
        RunnerConfig {
            destination: destination.into(),
            interval: Duration::from_secs(2),
            channel_size: 8,
        }
    }
}

/// Drives a `ProbeEngine` on a fixed cadence from a worker thread until
/// halted.
///
/// One runner per address family; each worker owns its engine and the
/// engine owns its counter pair, so families never share state. A failed
/// cycle is logged and the loop keeps going.
pub struct ProbeRunner {
    stop: StopCondition,
    worker: Option<JoinHandle<()>>,
    outcome_rx: mpsc::Receiver<ProbeOutcome>,
}

impl ProbeRunner {
    pub fn start<F: IcmpFamily + 'static>(config: RunnerConfig) -> ProbeRunner {
        let (outcome_tx, outcome_rx) = mpsc::sync_channel::<ProbeOutcome>(config.channel_size);
        let stop = StopCondition::new();
        let stop_for_worker = stop.clone();

        let worker = std::thread::spawn(move || {
            let mut engine = ProbeEngine::<F>::new();
            loop {
                let outcome = engine.probe(&config.destination);
                match &outcome {
                    Ok(report) => tracing::info!(
                        "ping {} ({}) from {}: rtt={:?} loss={}%",
                        config.destination,
                        report.peer_addr,
                        report.local_addr,
                        report.rtt,
                        report.loss_percent,
                    ),
                    Err(e) => tracing::error!("ping {}: {e}", config.destination),
                }
                // A slow consumer loses outcomes rather than stalling the
                // probe cadence.
                let _ = outcome_tx.try_send(outcome);

                if stop_for_worker.wait_timeout(config.interval) {
                    break;
                }
            }
            tracing::trace!("probe worker thread end");
        });

        ProbeRunner {
            stop,
            worker: Some(worker),
            outcome_rx,
        }
    }

    /// Blocks until the next cycle's outcome is available.
    pub fn next_outcome(&self) -> Result<ProbeOutcome, mpsc::RecvError> {
        self.outcome_rx.recv()
    }

    /// Stops the loop and joins the worker. An in-flight receive is not
    /// interrupted; the worker exits once its current cycle and wait end.
    pub fn halt(mut self) -> std::thread::Result<()> {
        self.stop.set_should_stop();
        match self.worker.take() {
            Some(handle) => handle.join(),
            None => Ok(()),
        }
    }
}

#[derive(Clone)]
struct StopCondition {
    condition: Arc<(Mutex<bool>, Condvar)>,
}

impl StopCondition {
    fn new() -> StopCondition {
        StopCondition {
            condition: Arc::new((Mutex::new(false), Condvar::new())),
        }
    }

    fn set_should_stop(&self) {
        let (lock, cvar) = &*self.condition;
        let mut should_stop = lock.lock().unwrap();
        *should_stop = true;
        cvar.notify_all();
    }

    /// Waits up to `timeout`, returning early with `true` when the stop
    /// flag is raised. The flag is checked under the lock before parking,
    /// so a stop raised just before the wait is never missed.
    fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.condition;
        let guard = lock.lock().unwrap();
        if *guard {
            return true;
        }
        let (should_stop, _) = cvar.wait_timeout(guard, timeout).unwrap();
        *should_stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icmp::IcmpV4;
    use std::time::Instant;

    #[test]
    fn runner_emits_outcomes_and_halts_deterministically() {
        let mut config = RunnerConfig::new("127.0.0.1");
        config.interval = Duration::from_millis(10);

        let runner = ProbeRunner::start::<IcmpV4>(config);

        // The first cycle's outcome arrives whether or not the probe has
        // raw-socket privileges; a failed probe must not kill the loop.
        let first = runner.next_outcome().unwrap();
        let second = runner.next_outcome().unwrap();
        assert_eq!(first.is_ok(), second.is_ok());

        runner.halt().unwrap();
    }

    #[test]
    fn halt_returns_promptly_while_worker_is_waiting() {
        let mut config = RunnerConfig::new("127.0.0.1");
        config.interval = Duration::from_secs(60);

        let runner = ProbeRunner::start::<IcmpV4>(config);
        let _ = runner.next_outcome().unwrap();

        let halt_start = Instant::now();
        runner.halt().unwrap();
        // The worker was parked in its 60 s inter-cycle wait; halt must
        // wake it instead of sitting the interval out.
        assert!(halt_start.elapsed() < Duration::from_secs(30));
    }

    #[test]
    fn stop_condition_wakes_waiters() {
        let stop = StopCondition::new();
        assert!(!stop.wait_timeout(Duration::from_millis(1)));

        stop.set_should_stop();
        assert!(stop.wait_timeout(Duration::from_millis(1)));
    }
}
