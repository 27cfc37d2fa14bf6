use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ProbeError;

/// Configuration for a single probe run. Passed by value into the resolver,
/// selector and verifier; nothing is read from ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    /// Envelope sender used in `MAIL FROM`.
    pub sender: String,
    /// Identity announced in `EHLO`.
    pub helo_domain: String,
    /// SMTP port. 25 for real servers; tests point this at loopback mocks.
    pub port: u16,
    /// Optional SOCKS5 proxy through which every connection is dialed.
    pub proxy: Option<ProxyEndpoint>,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
    /// Upper bound on how many candidates the liveness selector will dial.
    pub max_candidates: usize,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            sender: "test@example.com".to_string(),
            helo_domain: "example.com".to_string(),
            port: 25,
            proxy: None,
            connect_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(10),
            max_candidates: 8,
        }
    }
}

/// A SOCKS5 proxy endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyEndpoint {
    pub host: String,
    pub port: u16,
}

impl ProxyEndpoint {
    pub const DEFAULT_PORT: u16 = 1080;

    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for ProxyEndpoint {
    type Err = ProbeError;

    /// Accepts `host`, `host:port` or `scheme://host:port`. The host is
    /// whatever follows the last `/`, then split on `:`; a missing port
    /// falls back to [`Self::DEFAULT_PORT`].
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let bare = input.rsplit('/').next().unwrap_or(input);
        let (host, port) = match bare.split_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| ProbeError::InvalidProxy(input.to_string()))?;
                (host, port)
            }
            None => (bare, Self::DEFAULT_PORT),
        };
        if host.is_empty() {
            return Err(ProbeError::InvalidProxy(input.to_string()));
        }
        Ok(Self::new(host, port))
    }
}
