//! Threshold and sampling configuration.
//!
//! Each threshold resolves as: explicit flag, then environment
//! variable, then [`DEFAULT_THRESHOLD`]. An environment value that does
//! not parse as an integer is ignored.

use std::time::Duration;

use serde::Serialize;

/// Threshold used when neither a flag nor a valid environment value is set.
pub const DEFAULT_THRESHOLD: i64 = 80;

pub const CPU_THRESHOLD_ENV: &str = "CPU_THRESHOLD";
pub const MEM_THRESHOLD_ENV: &str = "MEM_THRESHOLD";
pub const DISK_THRESHOLD_ENV: &str = "DISK_THRESHOLD";

/// Default CPU sampling window in seconds.
pub const DEFAULT_INTERVAL_SECS: u64 = 1;

/// Alert thresholds in whole percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Thresholds {
    pub cpu: i64,
    pub mem: i64,
    pub disk: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu: DEFAULT_THRESHOLD,
            mem: DEFAULT_THRESHOLD,
            disk: DEFAULT_THRESHOLD,
        }
    }
}

impl Thresholds {
    /// Resolve thresholds from optional flags and an environment lookup.
    pub fn resolve<F>(cpu: Option<i64>, mem: Option<i64>, disk: Option<i64>, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            cpu: resolve_threshold(cpu, env(CPU_THRESHOLD_ENV).as_deref()),
            mem: resolve_threshold(mem, env(MEM_THRESHOLD_ENV).as_deref()),
            disk: resolve_threshold(disk, env(DISK_THRESHOLD_ENV).as_deref()),
        }
    }

    /// Resolve against the process environment.
    pub fn from_flags(cpu: Option<i64>, mem: Option<i64>, disk: Option<i64>) -> Self {
        Self::resolve(cpu, mem, disk, |name| std::env::var(name).ok())
    }
}

/// `flag`, else `env_value` if it parses, else the default.
pub fn resolve_threshold(flag: Option<i64>, env_value: Option<&str>) -> i64 {
    flag.or_else(|| env_value.and_then(|v| v.trim().parse().ok()))
        .unwrap_or(DEFAULT_THRESHOLD)
}

/// Parameters for one sampling run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleConfig {
    pub thresholds: Thresholds,
    /// CPU sampling window in seconds.
    pub interval_secs: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            interval_secs: DEFAULT_INTERVAL_SECS,
        }
    }
}

impl SampleConfig {
    pub fn new(thresholds: Thresholds, interval_secs: u64) -> Self {
        Self {
            thresholds,
            interval_secs,
        }
    }

    /// CPU sampling window.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
