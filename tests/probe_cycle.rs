use std::sync::Once;
use std::time::Duration;

use more_asserts as ma;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use ping_pulse::icmp::{IcmpV4, IcmpV6};
use ping_pulse::{ProbeEngine, ProbeRunner, RunnerConfig};

static SETUP: Once = Once::new();

fn setup() {
    SETUP.call_once(|| {
        let subscriber = FmtSubscriber::builder().with_max_level(Level::ERROR).finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("setting default subscriber failed");
    });
}

#[test]
#[ignore = "requires raw-socket privileges"]
fn probe_ipv4_loopback_succeeds() {
    setup();

    let mut engine = ProbeEngine::<IcmpV4>::new();
    let report = engine.probe("127.0.0.1").unwrap();

    assert_eq!("127.0.0.1".parse::<std::net::IpAddr>().unwrap(), report.peer_addr);
    ma::assert_lt!(report.rtt, Duration::from_millis(100));
    assert_eq!(0.0, report.loss_percent);
    assert_eq!(1, engine.packets_sent());
    assert_eq!(1, engine.packets_received());
}

#[test]
#[ignore = "requires raw-socket privileges"]
fn probe_ipv6_loopback_succeeds() {
    setup();

    let mut engine = ProbeEngine::<IcmpV6>::new();
    let report = engine.probe("::1").unwrap();

    ma::assert_lt!(report.rtt, Duration::from_millis(100));
    assert_eq!(0.0, report.loss_percent);
}

#[test]
fn probe_failure_is_returned_not_aborted() {
    setup();

    // Whatever fails first on this machine (listener privileges, DNS, or
    // discovery), the probe must hand back an error instead of exiting.
    let mut engine = ProbeEngine::<IcmpV4>::new();
    let result = engine.probe("host.that.does.not.resolve.invalid");
    assert!(result.is_err());
}

#[test]
fn runner_survives_failing_cycles_and_halts() {
    setup();

    let mut config = RunnerConfig::new("127.0.0.1");
    config.interval = Duration::from_millis(20);

    let runner = ProbeRunner::start::<IcmpV4>(config);
    for _ in 0..3 {
        runner.next_outcome().expect("worker stays alive across cycles");
    }
    runner.halt().expect("worker joins after halt");
}
