use std::io;

use thiserror::Error;

/// Errors surfaced by the probe.
///
/// DNS failures never appear here (they collapse to an empty MX list), and a
/// candidate that fails during liveness selection is simply skipped. Only
/// the recipient-verification session treats connection and I/O faults as
/// fatal.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("address has no domain part")]
    MissingDomain,
    #[error("invalid proxy endpoint '{0}'")]
    InvalidProxy(String),
    #[error("connection to {host} failed: {source}")]
    Connect {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("proxy connection through {proxy} failed: {source}")]
    Proxy {
        proxy: String,
        #[source]
        source: io::Error,
    },
    #[error("I/O error during SMTP session: {source}")]
    Io {
        #[source]
        source: io::Error,
    },
}

impl ProbeError {
    pub(crate) fn connect(host: impl Into<String>, source: io::Error) -> Self {
        Self::Connect {
            host: host.into(),
            source,
        }
    }

    pub(crate) fn io(source: io::Error) -> Self {
        Self::Io { source }
    }
}
