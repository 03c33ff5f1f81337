//! HTTP transport used by the probe loop.
//!
//! The probe only needs the status code of a GET response, so the
//! transport seam is a single method. `HttpTransport` is the real
//! implementation backed by a blocking `reqwest` client; tests script
//! their own outcomes.

use std::error::Error as StdError;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

/// Failure to obtain a response from the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request could not be completed (bad URL, DNS, connect, TLS, timeout).
    #[error("{0}")]
    Request(String),
    /// The HTTP client itself could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// Performs a single GET and returns the response status code.
pub trait Transport {
    fn get(&self, url: &str, timeout: Duration) -> Result<u16, TransportError>;
}

/// Blocking HTTP client with default TLS and redirect behavior.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Build the underlying client. Fails only if the TLS backend or
    /// system configuration cannot be initialised.
    pub fn new() -> Result<Self, TransportError> {
        Self::build(reqwest::blocking::Client::builder())
    }

    /// Like [`HttpTransport::new`] but ignores proxy environment variables.
    pub fn direct() -> Result<Self, TransportError> {
        Self::build(reqwest::blocking::Client::builder().no_proxy())
    }

    fn build(builder: reqwest::blocking::ClientBuilder) -> Result<Self, TransportError> {
        let client = builder
            .user_agent(concat!("probekit-http/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::ClientBuild(error_chain(&e)))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, timeout: Duration) -> Result<u16, TransportError> {
        match self.client.get(url).timeout(timeout).send() {
            Ok(resp) => Ok(resp.status().as_u16()),
            Err(e) => {
                debug!(
                    error = %e,
                    %url,
                    timeout = e.is_timeout(),
                    connect = e.is_connect(),
                    "probe request failed"
                );
                Err(TransportError::Request(error_chain(&e)))
            }
        }
    }
}

/// Render an error and its `source()` chain as `outer: inner: root`.
///
/// `reqwest` keeps the useful part (connection refused, DNS failure)
/// in the source chain, so the top-level message alone is too vague to
/// act on.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
