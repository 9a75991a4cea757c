use ping_pulse::icmp::{IcmpFamily, IcmpV4, IcmpV6};
use ping_pulse::{ProbeRunner, RunnerConfig};

type GenericError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(argh::FromArgs)]
/// ping-pulse - send periodic ICMP echo requests and report RTT and loss
struct Args {
    #[argh(option, short = '4')]
    /// IPv4 destination, hostname or literal address
    ipv4: Option<String>,

    #[argh(option, short = '6')]
    /// IPv6 destination, hostname or literal address
    ipv6: Option<String>,

    #[argh(option, short = 'c', default = "u16::MAX")]
    /// stop after <count> probe cycles per family
    count: u16,
}

fn run_family<F: IcmpFamily + 'static>(destination: String, count: u16) {
    let runner = ProbeRunner::start::<F>(RunnerConfig::new(destination.clone()));
    for _ in 0..count {
        match runner.next_outcome() {
            Ok(Ok(report)) => println!(
                "reply from {} ({destination}) via {}: rtt={:?} loss={}%",
                report.peer_addr, report.local_addr, report.rtt, report.loss_percent,
            ),
            Ok(Err(e)) => println!("probe {destination}: {e}"),
            Err(_) => break,
        }
    }
    let _ = runner.halt();
}

fn main() -> Result<(), GenericError> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args: Args = argh::from_env();
    if args.ipv4.is_none() && args.ipv6.is_none() {
        return Err("pass a destination with -4 and/or -6".into());
    }

    let mut workers = Vec::new();
    if let Some(destination) = args.ipv4 {
        workers.push(std::thread::spawn(move || {
            run_family::<IcmpV4>(destination, args.count);
        }));
    }
    if let Some(destination) = args.ipv6 {
        workers.push(std::thread::spawn(move || {
            run_family::<IcmpV6>(destination, args.count);
        }));
    }
    for worker in workers {
        let _ = worker.join();
    }

    Ok(())
}
