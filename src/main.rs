mod client;
mod config;
mod engine;
mod grouping;
mod models;
mod storage;
mod types;

use std::io::{stderr, stdout, BufWriter, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::exit;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use crate::client::{UsageClient, DEFAULT_API_BASE_URL, DEFAULT_PAGE_SIZE};
use crate::config::EnvironmentSource;
use crate::engine::{ExportEngine, DEFAULT_ACCOUNT_PREFIX};
use crate::models::ExportOutcome;

/// Exports monthly usage records for every configured account into per-account CSV files.
///
/// Accounts are read from `<PREFIX>_ACCOUNT_SID_<suffix>` / `<PREFIX>_AUTH_TOKEN_<suffix>`
/// environment variable pairs, including any defined in a `.env` file.
#[derive(Debug, Parser)]
#[command(name = "usage-exporter", version, about)]
struct Cli {
    /// Directory the `<account>.csv` files are written to (created if missing).
    #[arg(long, env = "USAGE_EXPORT_OUTPUT_DIR", default_value = "usage_exports")]
    output_dir: PathBuf,

    /// Prefix of the account identifier / token variable pairs.
    #[arg(long, env = "USAGE_EXPORT_PREFIX", default_value = DEFAULT_ACCOUNT_PREFIX)]
    prefix: String,

    /// Records requested per page from the usage API.
    #[arg(long, env = "USAGE_EXPORT_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE, value_parser = clap::value_parser!(u32).range(1..=1000))]
    page_size: u32,

    /// Root URL of the usage API.
    #[arg(long, env = "TWILIO_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    api_base_url: String,

    /// Maximum number of accounts exported at the same time (unbounded when omitted).
    #[arg(long, env = "USAGE_EXPORT_MAX_CONCURRENCY")]
    max_concurrency: Option<NonZeroUsize>,

    /// One of: error, warn, info, debug, trace.
    #[arg(long, env = "USAGE_EXPORT_LOG_LEVEL", default_value = "info", value_parser = parse_log_level)]
    log_level: LevelFilter
}

#[tokio::main]
async fn main() -> Result<()> {
    //NOTE: Loaded before parsing so `.env` values also feed the clap `env` fallbacks
    let dotenv_path = dotenvy::dotenv().ok();
    let cli = Cli::parse();

    setup_logging(cli.log_level);

    if let Some(path) = dotenv_path {
        debug!("Loaded environment from {}", path.display());
    }

    let client = UsageClient::new(&cli.api_base_url)?.with_page_size(cli.page_size);
    let engine = ExportEngine::new(Arc::new(client), cli.output_dir)
        .with_prefix(cli.prefix)
        .with_max_concurrency(cli.max_concurrency.map(NonZeroUsize::get));

    let timer = Instant::now();

    let outcomes = match engine.run(&EnvironmentSource).await {
        Ok(outcomes) => outcomes,
        Err(error) => {
            error!("{error}");
            eprintln!("Error: {error}");
            exit(1);
        }
    };

    let duration = timer.elapsed();

    info!("Exported {} account(s) in: {duration:?}", outcomes.len());

    write_summary_to_stdout(&outcomes)?;

    Ok(())
}

fn parse_log_level(level: &str) -> Result<LevelFilter, String> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" => Ok(LevelFilter::WARN),
        "error" => Ok(LevelFilter::ERROR),
        _ => Err(format!("invalid log level '{level}', expected one of: error, warn, info, debug, trace"))
    }
}

fn setup_logging(level: LevelFilter) {
    //NOTE: stdout carries the run summary, so logging goes to stderr
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}

fn write_summary_to_stdout(outcomes: &[ExportOutcome]) -> Result<()> {
    let mut output = BufWriter::new(stdout().lock());

    for outcome in outcomes {
        writeln!(output, "{outcome}")?;
    }

    output.flush()?;

    Ok(())
}
