//! Ripple-Probe main entry point
//!
//! This is the command-line interface for the Ripple-Probe batch HTTP prober.

use anyhow::Context;
use clap::Parser;
use ripple_probe::config::{load_layered, Config, ConfigOverrides, LineFormat, SummaryFormat};
use ripple_probe::output::{ConsoleOutput, RunReport};
use ripple_probe::probe::{probe_all, ConcurrencyLimiter, Coordinator};
use ripple_probe::UrlSource;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Ripple-Probe: a bounded-concurrency batch HTTP prober
///
/// Reads URLs (one per line) from a file or stdin, sends one GET to each
/// with at most CONCURRENCY requests in flight, prints one line per probe
/// and a summary of outcomes and latencies.
#[derive(Parser, Debug)]
#[command(name = "ripple-probe")]
#[command(version)]
#[command(about = "A bounded-concurrency batch HTTP prober", long_about = None)]
struct Cli {
    /// File with one URL per line; reads stdin when omitted or "-"
    #[arg(value_name = "URLS")]
    urls: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of requests in flight [env: CONCURRENCY]
    #[arg(short, long)]
    concurrency: Option<u32>,

    /// Per-request deadline in seconds [env: REQUEST_TIMEOUT]
    #[arg(short = 't', long)]
    timeout: Option<u64>,

    /// User-Agent header value [env: USER_AGENT]
    #[arg(long)]
    user_agent: Option<String>,

    /// Maximum number of URLs to probe [env: LIMIT]
    #[arg(short, long)]
    limit: Option<usize>,

    /// Per-request line format
    #[arg(long, value_enum)]
    format: Option<LineFormat>,

    /// Final summary format
    #[arg(long, value_enum)]
    summary: Option<SummaryFormat>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error logging
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration rejected: {:#}", e);
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let start_time = Instant::now();
    let result = run(cli, config).await;
    let elapsed = start_time.elapsed();

    match result {
        Ok((report, summary_format)) => {
            if summary_format == SummaryFormat::Text {
                println!("Total time: {:?}", report.elapsed);
            }
            tracing::info!("Finished in {:?}", elapsed);
        }
        Err(e) => {
            tracing::error!("Run failed: {:#}", e);
            let _ = write_fault(&mut io::stderr(), &e, elapsed);
        }
    }

    ExitCode::SUCCESS
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries only probe lines and the summary.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ripple_probe=info,warn"),
            1 => EnvFilter::new("ripple_probe=debug,info"),
            2 => EnvFilter::new("ripple_probe=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the layered configuration: defaults, file, environment, flags
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let overrides = ConfigOverrides {
        concurrency: cli.concurrency,
        request_timeout: cli.timeout,
        user_agent: cli.user_agent.clone(),
        limit: cli.limit,
        line_format: cli.format,
        summary_format: cli.summary,
    };

    let config =
        load_layered(cli.config.as_deref(), &overrides).context("invalid configuration")?;
    Ok(config)
}

/// Prints a caught run fault and the elapsed time
fn write_fault<W: Write>(
    out: &mut W,
    error: &anyhow::Error,
    elapsed: Duration,
) -> io::Result<()> {
    writeln!(out, "Error: {:#}", error)?;
    writeln!(out, "Total time: {:?}", elapsed)
}

/// Closes the limiter on Ctrl-C so queued probes end as cancelled
fn watch_interrupt(limiter: ConcurrencyLimiter) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling probes still waiting for a permit");
            limiter.close();
        }
    });
}

/// Handles the main probe run
async fn run(cli: Cli, config: Config) -> anyhow::Result<(RunReport, SummaryFormat)> {
    tracing::info!(
        "Starting probe: limit={}, request_timeout={}s, concurrency={}",
        config.probe.limit,
        config.probe.request_timeout,
        config.probe.concurrency
    );

    let coordinator = Coordinator::new(&config).context("building HTTP client")?;
    watch_interrupt(coordinator.cancel_handle());

    let stdout = io::stdout();
    let mut handler = ConsoleOutput::new(
        stdout.lock(),
        config.output.line_format,
        config.output.summary_format,
    );

    let report = match cli.urls.as_deref() {
        Some(path) if path.as_os_str() != "-" => {
            let source = UrlSource::open(path, config.probe.limit)
                .with_context(|| format!("opening URL list {}", path.display()))?;
            probe_all(&coordinator, source, &mut handler).await?
        }
        _ => {
            tracing::info!("Reading URLs from stdin");
            let source = UrlSource::from_reader(io::stdin().lock(), config.probe.limit);
            probe_all(&coordinator, source, &mut handler).await?
        }
    };

    Ok((report, config.output.summary_format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripple_probe::ProbeError;

    #[test]
    fn test_fault_message_and_time_printed() {
        let error = anyhow::Error::new(ProbeError::EmptySource);
        let mut buf = Vec::new();
        write_fault(&mut buf, &error, Duration::from_millis(12)).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Error: "));
        assert!(text.contains("Total time: 12ms"));
    }

    #[test]
    fn test_flags_win_over_defaults() {
        let cli = Cli::parse_from(["ripple-probe", "-c", "3", "--summary", "json", "urls.txt"]);
        let config = build_config(&cli).unwrap();

        assert_eq!(config.probe.concurrency, 3);
        assert_eq!(config.output.summary_format, SummaryFormat::Json);
    }

    #[test]
    fn test_invalid_flag_value_rejected() {
        let cli = Cli::parse_from(["ripple-probe", "-t", "0"]);
        assert!(build_config(&cli).is_err());
    }
}
