//! healthcheck — HTTP endpoint health checker.
//!
//! # Usage
//!
//! ```text
//! healthcheck --url https://example.com --retries 3 --timeout 5
//! ```
//!
//! Exits `0` when the endpoint answers with a 2xx/3xx status within the
//! attempt budget, `2` otherwise.

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use probekit_http::config::{DEFAULT_RETRIES, DEFAULT_TIMEOUT_SECS};
use probekit_http::{report_down, run_probe, ProbeConfig, EXIT_DOWN};

#[derive(Parser)]
#[command(name = "healthcheck", about = "HTTP health checker", version)]
struct Cli {
    /// URL to check (http/https)
    #[arg(long)]
    url: String,

    /// Retry attempts
    #[arg(
        long,
        default_value_t = DEFAULT_RETRIES,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    retries: u32,

    /// Seconds timeout per request
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = ProbeConfig::new(cli.url)
        .with_retries(cli.retries)
        .with_timeout_secs(cli.timeout);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if run_probe(&config, &mut out).context("HTTP client unavailable")? {
        Ok(ExitCode::SUCCESS)
    } else {
        report_down(&config, &mut out);
        Ok(ExitCode::from(EXIT_DOWN))
    }
}
