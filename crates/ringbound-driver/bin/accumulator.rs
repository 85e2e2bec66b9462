//! Accumulator CLI
//!
//! Starts producers and consumers on a bounded queue and prints the running
//! total once per interval.
//!
//! Usage:
//!   accumulator CAPACITY PRODUCERS CONSUMERS [--interval-ms N] [--duration-secs N]
//!
//! Logs go to stderr and honour `RUST_LOG`.

use std::io;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use ringbound_driver::{init_tracing, Accumulator, DriverConfig};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "accumulator",
    about = "Shows the accumulated value of items in flight through a bounded ring buffer"
)]
struct Cli {
    /// Queue capacity (at least 1)
    #[arg(allow_negative_numbers = true)]
    capacity: i64,

    /// Number of producer threads
    producers: usize,

    /// Number of consumer threads
    consumers: usize,

    /// Milliseconds between reports
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Stop after this many seconds instead of running until killed
    #[arg(long)]
    duration_secs: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            // Missing arguments print usage but are not a failure.
            ErrorKind::MissingRequiredArgument
            | ErrorKind::DisplayHelp
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            | ErrorKind::DisplayVersion => {
                err.print()?;
                return Ok(());
            }
            _ => err.exit(),
        },
    };

    init_tracing();

    println!("The program shows current accumulated value in a cyclic buffer.");
    println!("Producers push, consumers pop.");
    println!("By tuning params you can see how the value changes.\n");

    let config = DriverConfig::new(cli.capacity, cli.producers, cli.consumers)
        .with_report_interval(Duration::from_millis(cli.interval_ms));

    println!("Capacity: {}", config.capacity);
    println!("Producer count: {}", config.producers);
    println!("Consumer count: {}\n", config.consumers);

    let interval = config.report_interval;
    let acc = Accumulator::start(config).context("failed to start accumulator")?;
    let deadline = cli
        .duration_secs
        .and_then(|secs| Instant::now().checked_add(Duration::from_secs(secs)));

    println!("Accumulated value");
    acc.report_until(&mut io::stdout().lock(), interval, deadline)?;

    let report = acc.stop().context("accumulator did not stop cleanly")?;
    info!(
        value = report.value,
        pushed = report.pushed,
        popped = report.popped,
        residual = report.residual,
        "final report"
    );
    Ok(())
}
