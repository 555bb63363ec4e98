use anyhow::Context;
use clap::Parser;
use parking_ledger::cli::Args;
use parking_ledger::clock::FixedClock;
use parking_ledger::models::ProcessingStats;
use parking_ledger::processor::LedgerProcessor;
use std::process;
use tracing::debug;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    setup_logging(&args);

    match run(&args) {
        Ok(_stats) => {
            // Success - stats have already been reported by the processor
            process::exit(0);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

fn run(args: &Args) -> anyhow::Result<ProcessingStats> {
    let config = args
        .load_config()
        .context("Failed to load configuration")?;

    let processor = LedgerProcessor::new(args.input_path.clone(), args.output_path.clone())?
        .with_config(config);

    let processor = match args.as_of {
        Some(as_of) => {
            debug!("Open stays closed at fixed instant {}", as_of);
            processor.with_clock(FixedClock(as_of))
        }
        None => processor,
    };

    let stats = processor
        .run()
        .with_context(|| format!("Failed to process {}", args.input_path.display()))?;
    Ok(stats)
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("parking_ledger={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .init();

    debug!("Logging initialized at level: {}", log_level);
}
