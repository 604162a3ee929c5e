mod client;
mod config;
mod engine;
mod models;
mod sink;
mod source;

use std::io::stderr;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use crate::config::Cli;
use crate::engine::Pipeline;
use crate::sink::CsvSink;
use crate::source::RecordSource;

#[tokio::main]
async fn main() -> Result<()> {
    //NOTE: A missing .env file is the normal case, the token can come from the real environment or --token
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    setup_logging(parse_log_level(&cli.log_level));

    let config = cli.into_config()?;
    debug!("Running with {config:?}");

    let pipeline = Pipeline::from_config(&config)?;
    let source = RecordSource::open(&config.input)?;
    let mut sink = CsvSink::create(&config.output).await?;

    info!("Enriching {} into {}", config.input.display(), config.output.display());

    let timer = Instant::now();
    let summary = pipeline.run(source, &mut sink).await?;
    let duration = timer.elapsed();

    info!(
        "Processed {} transactions in {} batches ({} ok, {} failed) in: {duration:?}",
        summary.total, summary.batches, summary.succeeded, summary.failed
    );
    info!("Results written to {}", config.output.display());

    Ok(())
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'info'", level);
            LevelFilter::INFO
        }
    }
}

fn setup_logging(level: LevelFilter) {
    //NOTE: Results go to the output file, stderr is reserved for logs and progress
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}
