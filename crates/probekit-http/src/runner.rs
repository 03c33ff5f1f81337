//! Retrying probe loop.
//!
//! Runs up to `retries` attempts against the configured URL, writes one
//! line per attempt to the output sink and stops at the first success.
//! Attempts are separated by a fixed [`RETRY_DELAY`]; there is no
//! pause after the last attempt or after a success.

use std::fmt;
use std::io::Write;
use std::ops::Range;
use std::time::Duration;

use tracing::debug;

use crate::config::ProbeConfig;
use crate::transport::{HttpTransport, Transport, TransportError};

/// Pause between consecutive attempts.
pub const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Process exit code for a DOWN verdict.
pub const EXIT_DOWN: u8 = 2;

/// Status codes treated as healthy.
const HEALTHY_STATUS: Range<u16> = 200..400;

/// Outcome of a single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Response status in `[200, 400)`.
    Success(u16),
    /// Response received with any other status.
    BadStatus(u16),
    /// No response: connection, DNS, TLS, timeout or URL error.
    TransportError(String),
}

/// Classify a status code.
pub fn classify(status: u16) -> AttemptOutcome {
    if HEALTHY_STATUS.contains(&status) {
        AttemptOutcome::Success(status)
    } else {
        AttemptOutcome::BadStatus(status)
    }
}

/// One attempt, numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptResult<'a> {
    pub url: &'a str,
    pub attempt: u32,
    pub outcome: AttemptOutcome,
}

impl AttemptResult<'_> {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Success(_))
    }
}

impl fmt::Display for AttemptResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            AttemptOutcome::Success(code) => {
                write!(f, "[UP] {} responded {} on attempt {}", self.url, code, self.attempt)
            }
            AttemptOutcome::BadStatus(code) => {
                write!(f, "[WARN] {} responded {} on attempt {}", self.url, code, self.attempt)
            }
            AttemptOutcome::TransportError(message) => {
                write!(f, "[ERROR] Attempt {} failed: {}", self.attempt, message)
            }
        }
    }
}

/// Blocks the probe between attempts.
pub trait Pause {
    fn pause(&mut self, duration: Duration);
}

/// Sleeps the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPause;

impl Pause for ThreadPause {
    fn pause(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Runs the attempt loop over a transport.
pub struct Prober<T, P> {
    transport: T,
    pause: P,
}

impl<T: Transport, P: Pause> Prober<T, P> {
    pub fn new(transport: T, pause: P) -> Self {
        Self { transport, pause }
    }

    /// Probe `config.url` and return whether it came up within the
    /// attempt budget. Never fails: every problem becomes a line in `out`.
    pub fn run<W: Write>(&mut self, config: &ProbeConfig, out: &mut W) -> bool {
        let retries = config.retries.max(1);

        for attempt in 1..=retries {
            let outcome = match self.transport.get(&config.url, config.timeout()) {
                Ok(status) => classify(status),
                Err(TransportError::Request(message) | TransportError::ClientBuild(message)) => {
                    AttemptOutcome::TransportError(message)
                }
            };
            let result = AttemptResult {
                url: &config.url,
                attempt,
                outcome,
            };
            emit(out, &result);

            if result.is_success() {
                debug!(url = %config.url, attempt, "endpoint up");
                return true;
            }

            if attempt < retries {
                self.pause.pause(RETRY_DELAY);
            }
        }

        debug!(url = %config.url, retries, "attempt budget exhausted");
        false
    }

    /// Consume the prober, returning its transport and pause.
    pub fn into_parts(self) -> (T, P) {
        (self.transport, self.pause)
    }
}

/// Probe with the real HTTP client and thread sleeps.
///
/// Errors only if the HTTP client cannot be built, which happens before
/// the first attempt.
pub fn run_probe<W: Write>(config: &ProbeConfig, out: &mut W) -> Result<bool, TransportError> {
    let transport = HttpTransport::new()?;
    Ok(Prober::new(transport, ThreadPause).run(config, out))
}

/// Write the final `[DOWN]` line for an exhausted probe.
pub fn report_down<W: Write>(config: &ProbeConfig, out: &mut W) {
    emit(
        out,
        format_args!(
            "[DOWN] {} is not healthy after {} attempts",
            config.url, config.retries
        ),
    );
}

fn emit<W: Write>(out: &mut W, line: impl fmt::Display) {
    if let Err(e) = writeln!(out, "{line}").and_then(|()| out.flush()) {
        debug!(error = %e, "failed to write probe output");
    }
}
