#![warn(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub use probe_engine::ProbeEngine;
pub use probe_error::ProbeError;
pub use probe_report::ProbeReport;
pub use probe_runner::{ProbeOutcome, ProbeRunner, RunnerConfig};

mod counters;
pub mod icmp;
mod local_addr;
mod probe_engine;
mod probe_error;
mod probe_report;
mod probe_runner;
mod resolve;
