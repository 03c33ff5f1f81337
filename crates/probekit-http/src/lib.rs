//! probekit-http — HTTP endpoint health checking.
//!
//! Issues up to `retries` GET requests against a URL and reports a
//! binary UP/DOWN verdict. Every attempt is classified, written to the
//! caller's output sink as a single line, and either short-circuits the
//! run (success) or is followed by a fixed one-second pause.
//!
//! # Architecture
//!
//! ```text
//! Prober
//!   ├── Transport::get() → status code or TransportError
//!   ├── classify() → AttemptOutcome (Success / BadStatus / TransportError)
//!   ├── writes "[UP]" / "[WARN]" / "[ERROR]" lines to the sink
//!   └── Pause::pause(1s) between attempts
//! ```
//!
//! The binary maps the verdict to an exit code: `0` for UP, `2` for
//! DOWN after printing the `[DOWN]` line.

pub mod config;
pub mod runner;
pub mod transport;

pub use config::ProbeConfig;
pub use runner::{
    classify, report_down, run_probe, AttemptOutcome, AttemptResult, Pause, Prober, ThreadPause,
    EXIT_DOWN, RETRY_DELAY,
};
pub use transport::{HttpTransport, Transport, TransportError};
