//! Threshold evaluation and report lines.

use std::fmt;

use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;
use tracing::{info, warn};

use crate::collector::{root_mount, MetricSource, SampleError};
use crate::config::{SampleConfig, Thresholds};

/// Exit code for an ALERT verdict.
pub const EXIT_ALERT: u8 = 2;

/// Verdict of one sampling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Alert,
}

impl Status {
    pub fn exit_code(self) -> u8 {
        match self {
            Status::Ok => 0,
            Status::Alert => EXIT_ALERT,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Ok => "OK",
            Status::Alert => "ALERT",
        })
    }
}

/// One reading of host utilization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub cpu: f64,
    pub mem: f64,
    pub disk: f64,
    pub procs: usize,
}

impl Metrics {
    /// ALERT if any percentage is strictly above its threshold.
    pub fn evaluate(&self, thresholds: &Thresholds) -> Status {
        if self.cpu > thresholds.cpu as f64
            || self.mem > thresholds.mem as f64
            || self.disk > thresholds.disk as f64
        {
            Status::Alert
        } else {
            Status::Ok
        }
    }
}

/// The single per-run report line.
pub struct Report<'a> {
    pub host: &'a str,
    pub metrics: &'a Metrics,
    pub thresholds: &'a Thresholds,
    pub status: Status,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.metrics;
        write!(
            f,
            "Host={} | CPU={:.1}% MEM={:.1}% DISK={:.1}% procs={}",
            self.host, m.cpu, m.mem, m.disk, m.procs
        )?;
        match self.status {
            Status::Alert => {
                let t = self.thresholds;
                write!(f, " | Thresholds cpu/mem/disk={}/{}/{}", t.cpu, t.mem, t.disk)
            }
            Status::Ok => f.write_str(" | All metrics within thresholds"),
        }
    }
}

/// Sample every metric once, evaluate and log the report line.
///
/// Blocks for the configured CPU window. Collector failures are
/// returned as-is; they are not retried.
pub fn sample_and_evaluate<M: MetricSource>(
    config: &SampleConfig,
    source: &mut M,
) -> Result<(Status, Metrics), SampleError> {
    let cpu = source.cpu_percent(config.interval());
    let mem = source.memory_percent();
    let disk = source.disk_percent(root_mount())?;
    let procs = source.process_count();

    let metrics = Metrics {
        cpu,
        mem,
        disk,
        procs,
    };
    let status = metrics.evaluate(&config.thresholds);

    let host = source.host_name();
    let report = Report {
        host: &host,
        metrics: &metrics,
        thresholds: &config.thresholds,
        status,
    };
    match status {
        Status::Ok => info!("{report}"),
        Status::Alert => warn!("{report}"),
    }

    Ok((status, metrics))
}

/// Render a naive timestamp in ISO 8601 with a literal `Z` appended.
///
/// Fractional seconds are printed as microseconds and omitted when
/// zero. The `Z` is textual; no zone conversion happens here.
pub fn iso_z(ts: NaiveDateTime) -> String {
    let text = if ts.nanosecond() / 1_000 == 0 {
        ts.format("%Y-%m-%dT%H:%M:%S")
    } else {
        ts.format("%Y-%m-%dT%H:%M:%S%.6f")
    };
    format!("{text}Z")
}

/// Completion record for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunRecord {
    pub status: Status,
    pub started: NaiveDateTime,
    pub ended: NaiveDateTime,
}

impl fmt::Display for RunRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Run complete | status={} | started={} | ended={}",
            self.status,
            iso_z(self.started),
            iso_z(self.ended)
        )
    }
}

/// Machine-readable view of a run, for `--format json`.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub status: Status,
    pub host: String,
    #[serde(flatten)]
    pub metrics: Metrics,
    pub thresholds: Thresholds,
    pub started: String,
    pub ended: String,
}

impl Summary {
    pub fn new(host: String, metrics: Metrics, thresholds: Thresholds, record: &RunRecord) -> Self {
        Self {
            status: record.status,
            host,
            metrics,
            thresholds,
            started: iso_z(record.started),
            ended: iso_z(record.ended),
        }
    }
}
