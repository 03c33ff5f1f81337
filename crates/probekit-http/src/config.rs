//! Probe configuration.

use std::time::Duration;

/// Default number of attempts.
pub const DEFAULT_RETRIES: u32 = 3;

/// Default per-attempt timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Immutable parameters for a single probe run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Endpoint to GET.
    pub url: String,
    /// Maximum number of attempts (at least 1).
    pub retries: u32,
    /// Per-attempt timeout in whole seconds.
    pub timeout_secs: u64,
}

impl ProbeConfig {
    /// Create a config with the given URL and the default retry budget.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            retries: DEFAULT_RETRIES,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Override the attempt budget. Values below 1 are raised to 1.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries.max(1);
        self
    }

    /// Override the per-attempt timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Per-attempt timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ProbeConfig::new("http://localhost/");
        assert_eq!(config.retries, 3);
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn retries_never_drop_below_one() {
        let config = ProbeConfig::new("http://localhost/").with_retries(0);
        assert_eq!(config.retries, 1);
    }
}
