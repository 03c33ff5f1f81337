//! probekit-sys — one-shot host resource monitoring.
//!
//! Takes a single sample of CPU, memory and root-disk utilization plus
//! the live process count, compares each percentage against its
//! threshold and logs an OK/ALERT verdict.
//!
//! # Architecture
//!
//! ```text
//! SampleConfig (flag > env > default 80)
//!   └── sample_and_evaluate()
//!         ├── MetricSource (SysinfoCollector)
//!         │     ├── cpu_percent(window)   blocks for the window
//!         │     ├── memory_percent()
//!         │     ├── disk_percent("/")
//!         │     └── process_count()
//!         ├── Metrics::evaluate() → Status (OK / ALERT)
//!         └── Report → one INFO or WARNING line
//!
//! logging::init()
//!   └── console (stderr) + append-mode log file, "time | LEVEL | message"
//! ```

pub mod collector;
pub mod config;
pub mod logging;
pub mod sampler;

pub use collector::{root_mount, MetricSource, SampleError, SysinfoCollector};
pub use config::{SampleConfig, Thresholds, DEFAULT_THRESHOLD};
pub use sampler::{sample_and_evaluate, Metrics, Report, RunRecord, Status, Summary};
