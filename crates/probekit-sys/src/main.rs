//! sysmon — one-shot system health monitor.
//!
//! # Usage
//!
//! ```text
//! sysmon
//! sysmon --cpu 85 --mem 85 --disk 90 --interval 2
//! CPU_THRESHOLD=90 sysmon
//! ```
//!
//! Exits `0` when every metric is within its threshold, `2` on ALERT.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, ValueEnum};
use tracing::info;

use probekit_sys::config::DEFAULT_INTERVAL_SECS;
use probekit_sys::{
    logging, sample_and_evaluate, MetricSource, RunRecord, SampleConfig, Summary,
    SysinfoCollector, Thresholds,
};

#[derive(Parser)]
#[command(
    name = "sysmon",
    about = "System Health Monitor",
    version,
    allow_negative_numbers = true
)]
struct Cli {
    /// CPU usage threshold percent [env: CPU_THRESHOLD, default: 80]
    #[arg(long)]
    cpu: Option<i64>,

    /// Memory usage threshold percent [env: MEM_THRESHOLD, default: 80]
    #[arg(long)]
    mem: Option<i64>,

    /// Disk usage threshold percent [env: DISK_THRESHOLD, default: 80]
    #[arg(long)]
    disk: Option<i64>,

    /// Seconds to wait while sampling CPU
    #[arg(long, default_value_t = DEFAULT_INTERVAL_SECS)]
    interval: u64,

    /// Log file path (default: system_health.log next to the executable)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Output format: text or json
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let log_path = cli.log_file.unwrap_or_else(logging::default_log_path);
    logging::init(&log_path)?;

    let mut collector = SysinfoCollector::new().context("metrics collector unavailable")?;

    let thresholds = Thresholds::from_flags(cli.cpu, cli.mem, cli.disk);
    let config = SampleConfig::new(thresholds, cli.interval);

    let started = Utc::now().naive_utc();
    let (status, metrics) = sample_and_evaluate(&config, &mut collector)?;
    let ended = Utc::now().naive_utc();

    let record = RunRecord {
        status,
        started,
        ended,
    };
    info!("{record}");

    if cli.format == OutputFormat::Json {
        let summary = Summary::new(collector.host_name(), metrics, config.thresholds, &record);
        println!("{}", serde_json::to_string(&summary)?);
    }

    Ok(ExitCode::from(status.exit_code()))
}
